//! Celebrant selection and template choice.

use chrono::NaiveDate;
use rand::Rng;
use rand::seq::SliceRandom;

use crate::config::{ConfigError, MessageTemplate, Person};

/// Returns the people whose birthday is on `today`, keeping input order.
///
/// Only month and day are compared; a Feb 29 birthday matches Feb 29 only.
#[must_use]
pub fn celebrants_on(people: &[Person], today: NaiveDate) -> Vec<&Person> {
    people
        .iter()
        .filter(|person| person.has_birthday_on(today))
        .collect()
}

/// Chooses one template uniformly at random.
pub fn pick_template<'a, R>(
    templates: &'a [MessageTemplate],
    rng: &mut R,
) -> Result<&'a MessageTemplate, ConfigError>
where
    R: Rng + ?Sized,
{
    templates.choose(rng).ok_or(ConfigError::NoTemplates)
}

#[cfg(test)]
mod tests {
    use chrono::Datelike;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn person(name: &str, birthday: NaiveDate) -> Person {
        Person::new(name.to_owned(), name.to_lowercase(), birthday)
    }

    #[test]
    fn test_celebrants_match_month_and_day_only() {
        let people = vec![
            person("Ana", date(1990, 5, 10)),
            person("Bob", date(1990, 5, 11)),
            person("Cid", date(2001, 5, 10)),
            person("Dee", date(1990, 6, 10)),
        ];

        let names: Vec<&str> = celebrants_on(&people, date(2024, 5, 10))
            .iter()
            .map(|p| p.name.as_str())
            .collect();

        assert_eq!(names, vec!["Ana", "Cid"]);
    }

    #[test]
    fn test_celebrants_every_day_of_year() {
        let people = vec![
            person("Ana", date(1990, 1, 31)),
            person("Bob", date(1985, 7, 4)),
            person("Cid", date(1970, 12, 25)),
        ];

        let mut day = date(2023, 1, 1);
        while day.year() == 2023 {
            for found in celebrants_on(&people, day) {
                assert!(found.has_birthday_on(day));
            }
            let expected = people.iter().filter(|p| p.has_birthday_on(day)).count();
            assert_eq!(celebrants_on(&people, day).len(), expected);
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_no_celebrants() {
        let people = vec![person("Ana", date(1990, 5, 10))];
        assert!(celebrants_on(&people, date(2024, 5, 9)).is_empty());
        assert!(celebrants_on(&[], date(2024, 5, 10)).is_empty());
    }

    #[test]
    fn test_leap_day_birthday() {
        let people = vec![person("Lena", date(1996, 2, 29))];
        assert_eq!(celebrants_on(&people, date(2024, 2, 29)).len(), 1);
        assert!(celebrants_on(&people, date(2023, 2, 28)).is_empty());
        assert!(celebrants_on(&people, date(2023, 3, 1)).is_empty());
    }

    #[test]
    fn test_pick_single_template() {
        let templates = vec![MessageTemplate::new("only one")];
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            assert_eq!(pick_template(&templates, &mut rng).unwrap().text, "only one");
        }
    }

    #[test]
    fn test_pick_stays_within_list_and_covers_it() {
        let templates = vec![
            MessageTemplate::new("a"),
            MessageTemplate::new("b"),
            MessageTemplate::new("c"),
        ];
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = std::collections::HashSet::new();

        for _ in 0..300 {
            let picked = pick_template(&templates, &mut rng).unwrap();
            assert!(templates.contains(picked));
            seen.insert(picked.text.clone());
        }

        assert_eq!(seen.len(), 3);
    }

    #[test]
    fn test_pick_is_deterministic_for_seed() {
        let templates: Vec<MessageTemplate> =
            (0..10).map(|i| MessageTemplate::new(format!("t{i}"))).collect();

        let first: Vec<&str> = {
            let mut rng = StdRng::seed_from_u64(1);
            (0..5)
                .map(|_| pick_template(&templates, &mut rng).unwrap().text.as_str())
                .collect()
        };
        let second: Vec<&str> = {
            let mut rng = StdRng::seed_from_u64(1);
            (0..5)
                .map(|_| pick_template(&templates, &mut rng).unwrap().text.as_str())
                .collect()
        };

        assert_eq!(first, second);
    }

    #[test]
    fn test_pick_from_empty_list() {
        let mut rng = StdRng::seed_from_u64(0);
        assert!(matches!(
            pick_template(&[], &mut rng),
            Err(ConfigError::NoTemplates)
        ));
    }
}
