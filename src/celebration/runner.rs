//! Birthday run orchestration.
//!
//! A run is a straight line:
//! 1. Read the Telegram configuration (fails before any data is touched)
//! 2. Load people and templates
//! 3. Select today's celebrants; stop early if there are none
//! 4. For each celebrant: pick a template, render it, deliver it
//!
//! A failed delivery is logged and recorded, and the run moves on to the
//! next celebrant.

use std::fmt;

use chrono::NaiveDate;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::{celebrants_on, pick_template};
use crate::config::{ConfigError, DataError, DataSource, MessageTemplate, Person, TelegramConfig};
use crate::telegram::{MessageSender, TelegramError};

/// Errors that abort a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Failed to set up Telegram client: {0}")]
    Client(#[source] TelegramError),
}

/// A person being congratulated today, with the chosen greeting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Celebrant {
    pub person: Person,
    pub template: MessageTemplate,
    pub text: String,
}

/// A greeting that reached the chat.
pub type Delivery = Celebrant;

/// A greeting that could not be delivered.
#[derive(Debug)]
pub struct FailedDelivery {
    pub celebrant: Celebrant,
    pub error: TelegramError,
}

/// Outcome of a single run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Number of people in the birthday list.
    pub people_loaded: usize,

    /// Messages that were delivered, in input order.
    pub delivered: Vec<Delivery>,

    /// Messages that failed, in input order.
    pub failed: Vec<FailedDelivery>,
}

impl RunReport {
    /// True when nobody had a birthday on the run date.
    #[must_use]
    pub fn no_birthdays(&self) -> bool {
        self.delivered.is_empty() && self.failed.is_empty()
    }

    /// Total number of celebrants, delivered or not.
    #[must_use]
    pub fn celebrant_count(&self) -> usize {
        self.delivered.len() + self.failed.len()
    }

    /// True when every attempted delivery succeeded.
    #[must_use]
    pub fn all_delivered(&self) -> bool {
        self.failed.is_empty()
    }

    /// Texts of the messages that were sent.
    #[must_use]
    pub fn sent_messages(&self) -> Vec<&str> {
        self.delivered.iter().map(|d| d.text.as_str()).collect()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.no_birthdays() {
            return write!(f, "No birthdays today.");
        }

        if !self.delivered.is_empty() {
            writeln!(f, "Sent the following birthday messages:")?;
            for delivery in &self.delivered {
                writeln!(f, "- {}", delivery.text)?;
            }
        }

        if !self.failed.is_empty() {
            writeln!(f, "Failed to send birthday messages:")?;
            for failure in &self.failed {
                writeln!(f, "- {}: {}", failure.celebrant.person.name, failure.error)?;
            }
        }

        Ok(())
    }
}

/// Runs the whole birthday flow.
///
/// `lookup` supplies environment variables, `connect` builds the sender from
/// the resulting configuration. Configuration is validated before `source`
/// is read.
pub async fn run<L, D, F, S, R>(
    lookup: L,
    source: &D,
    connect: F,
    today: NaiveDate,
    rng: &mut R,
) -> Result<RunReport, RunError>
where
    L: Fn(&str) -> Option<String>,
    D: DataSource + ?Sized,
    F: FnOnce(&TelegramConfig) -> Result<S, TelegramError>,
    S: MessageSender,
    R: Rng + ?Sized,
{
    let config = TelegramConfig::from_lookup(lookup)?;
    debug!("Loaded Telegram configuration: {:?}", config);

    let sender = connect(&config).map_err(RunError::Client)?;

    congratulate(source, &sender, &config.chat_id, today, rng).await
}

/// Congratulates everyone whose birthday is `today`.
pub async fn congratulate<D, S, R>(
    source: &D,
    sender: &S,
    chat_id: &str,
    today: NaiveDate,
    rng: &mut R,
) -> Result<RunReport, RunError>
where
    D: DataSource + ?Sized,
    S: MessageSender,
    R: Rng + ?Sized,
{
    let people = source.load_people()?;
    let templates = source.load_templates()?;

    info!(
        "Loaded {} people and {} message templates",
        people.len(),
        templates.len()
    );

    let mut report = RunReport {
        people_loaded: people.len(),
        ..RunReport::default()
    };

    if people.is_empty() {
        warn!("Birthday list is empty");
        return Ok(report);
    }

    let celebrants = celebrants_on(&people, today);
    if celebrants.is_empty() {
        info!("No birthdays on {}", today);
        return Ok(report);
    }

    if templates.is_empty() {
        return Err(ConfigError::NoTemplates.into());
    }

    info!("{} birthday(s) on {}", celebrants.len(), today);

    for person in celebrants {
        let template = pick_template(&templates, rng)?;
        let celebrant = Celebrant {
            person: person.clone(),
            template: template.clone(),
            text: template.render(person),
        };

        match sender.send_message(chat_id, &celebrant.text).await {
            Ok(()) => {
                info!("Congratulated {}", person.name);
                report.delivered.push(celebrant);
            }
            Err(e) => {
                error!("Failed to congratulate {}: {}", person.name, e);
                report.failed.push(FailedDelivery {
                    celebrant,
                    error: e,
                });
            }
        }
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::future::Future;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn person(name: &str, nickname: &str, birthday: NaiveDate) -> Person {
        Person::new(name.to_owned(), nickname.to_owned(), birthday)
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn full_env() -> impl Fn(&str) -> Option<String> {
        env(&[("TELEGRAM_BOT_TOKEN", "123:abc"), ("TELEGRAM_CHAT_ID", "-100")])
    }

    /// In-memory data source that counts how often it is read.
    struct SpySource {
        people: Vec<Person>,
        templates: Vec<MessageTemplate>,
        reads: AtomicUsize,
    }

    impl SpySource {
        fn new(people: Vec<Person>, templates: Vec<MessageTemplate>) -> Self {
            Self {
                people,
                templates,
                reads: AtomicUsize::new(0),
            }
        }

        fn reads(&self) -> usize {
            self.reads.load(Ordering::SeqCst)
        }
    }

    impl DataSource for SpySource {
        fn load_people(&self) -> Result<Vec<Person>, DataError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.people.clone())
        }

        fn load_templates(&self) -> Result<Vec<MessageTemplate>, DataError> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            Ok(self.templates.clone())
        }
    }

    /// Records every message and fails those mentioning `fail_for`.
    #[derive(Default)]
    struct FakeSender {
        fail_for: Option<String>,
        sent: Mutex<Vec<(String, String)>>,
    }

    impl FakeSender {
        fn failing_for(name: &str) -> Self {
            Self {
                fail_for: Some(name.to_owned()),
                ..Self::default()
            }
        }

        fn attempts(&self) -> Vec<(String, String)> {
            self.sent.lock().unwrap().clone()
        }
    }

    impl MessageSender for FakeSender {
        fn send_message(
            &self,
            chat_id: &str,
            text: &str,
        ) -> impl Future<Output = Result<(), TelegramError>> + Send {
            self.sent
                .lock()
                .unwrap()
                .push((chat_id.to_owned(), text.to_owned()));
            let fail = self.fail_for.as_deref().is_some_and(|name| text.contains(name));
            async move {
                if fail {
                    Err(TelegramError::Api {
                        status: 500,
                        description: "boom".to_owned(),
                    })
                } else {
                    Ok(())
                }
            }
        }
    }

    fn templates() -> Vec<MessageTemplate> {
        vec![MessageTemplate::new("Happy birthday, {name} ({nickname})!")]
    }

    #[tokio::test]
    async fn congratulates_single_celebrant() {
        let source = SpySource::new(
            vec![
                person("Ana", "ana_b", date(1990, 5, 10)),
                person("Bob", "bobby", date(1988, 7, 1)),
            ],
            templates(),
        );
        let sender = FakeSender::default();
        let mut rng = StdRng::seed_from_u64(1);

        let report = congratulate(&source, &sender, "-100", date(2024, 5, 10), &mut rng)
            .await
            .unwrap();

        assert_eq!(report.people_loaded, 2);
        assert_eq!(report.celebrant_count(), 1);
        assert_eq!(report.sent_messages(), vec!["Happy birthday, Ana (ana_b)!"]);
        assert_eq!(
            sender.attempts(),
            vec![("-100".to_owned(), "Happy birthday, Ana (ana_b)!".to_owned())]
        );
        assert!(report.to_string().contains("Sent the following birthday messages:"));
    }

    #[tokio::test]
    async fn no_birthdays_means_no_delivery() {
        let source = SpySource::new(vec![person("Ana", "ana_b", date(1990, 5, 10))], templates());
        let sender = FakeSender::default();
        let mut rng = StdRng::seed_from_u64(1);

        let report = congratulate(&source, &sender, "-100", date(2024, 5, 11), &mut rng)
            .await
            .unwrap();

        assert!(report.no_birthdays());
        assert_eq!(report.people_loaded, 1);
        assert!(sender.attempts().is_empty());
        assert_eq!(report.to_string(), "No birthdays today.");
    }

    #[tokio::test]
    async fn empty_birthday_list_is_not_an_error() {
        let source = SpySource::new(vec![], templates());
        let sender = FakeSender::default();
        let mut rng = StdRng::seed_from_u64(1);

        let report = congratulate(&source, &sender, "-100", date(2024, 5, 10), &mut rng)
            .await
            .unwrap();

        assert!(report.no_birthdays());
        assert_eq!(report.people_loaded, 0);
        assert!(sender.attempts().is_empty());
    }

    #[tokio::test]
    async fn one_failure_does_not_stop_the_others() {
        let today = date(2024, 3, 3);
        let source = SpySource::new(
            vec![
                person("Ana", "ana", date(1990, 3, 3)),
                person("Bob", "bob", date(1991, 3, 3)),
                person("Cid", "cid", date(1992, 3, 3)),
            ],
            templates(),
        );
        let sender = FakeSender::failing_for("Bob");
        let mut rng = StdRng::seed_from_u64(1);

        let report = congratulate(&source, &sender, "-100", today, &mut rng)
            .await
            .unwrap();

        assert_eq!(sender.attempts().len(), 3);
        assert_eq!(report.delivered.len(), 2);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].celebrant.person.name, "Bob");
        assert!(!report.all_delivered());

        let names: Vec<&str> = report.delivered.iter().map(|d| d.person.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Cid"]);

        let printed = report.to_string();
        assert!(printed.contains("Failed to send birthday messages:"));
        assert!(printed.contains("- Bob: "));
    }

    #[tokio::test]
    async fn missing_templates_with_celebrants_is_fatal() {
        let source = SpySource::new(vec![person("Ana", "ana_b", date(1990, 5, 10))], vec![]);
        let sender = FakeSender::default();
        let mut rng = StdRng::seed_from_u64(1);

        let err = congratulate(&source, &sender, "-100", date(2024, 5, 10), &mut rng)
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::Config(ConfigError::NoTemplates)));
        assert!(sender.attempts().is_empty());
    }

    #[tokio::test]
    async fn missing_token_aborts_before_reading_data() {
        let source = SpySource::new(vec![person("Ana", "ana_b", date(1990, 5, 10))], templates());
        let mut rng = StdRng::seed_from_u64(1);
        let mut connected = false;

        let err = run(
            env(&[("TELEGRAM_CHAT_ID", "-100")]),
            &source,
            |_| {
                connected = true;
                Ok(FakeSender::default())
            },
            date(2024, 5, 10),
            &mut rng,
        )
        .await
        .unwrap_err();

        assert!(matches!(
            err,
            RunError::Config(ConfigError::MissingEnvVar("TELEGRAM_BOT_TOKEN"))
        ));
        assert_eq!(source.reads(), 0);
        assert!(!connected);
    }

    #[tokio::test]
    async fn run_uses_configured_chat_id() {
        let source = SpySource::new(vec![person("Ana", "ana_b", date(1990, 5, 10))], templates());
        let sender = FakeSender::default();
        let mut rng = StdRng::seed_from_u64(1);

        let report = run(full_env(), &source, |_| Ok(&sender), date(2024, 5, 10), &mut rng)
            .await
            .unwrap();

        assert_eq!(report.delivered.len(), 1);
        assert_eq!(source.reads(), 2);
        let attempts = sender.attempts();
        assert_eq!(attempts.len(), 1);
        assert_eq!(attempts[0].0, "-100");
        assert!(attempts[0].1.contains("Ana"));
        assert!(attempts[0].1.contains("ana_b"));
    }

    #[tokio::test]
    async fn client_setup_failure_is_fatal() {
        let source = SpySource::new(vec![], templates());
        let mut rng = StdRng::seed_from_u64(1);

        let err = run(
            full_env(),
            &source,
            |_| Err::<FakeSender, _>(TelegramError::Client("no tls".to_owned())),
            date(2024, 5, 10),
            &mut rng,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RunError::Client(_)));
        assert_eq!(source.reads(), 0);
    }

    #[tokio::test]
    async fn data_errors_propagate() {
        struct BrokenSource;

        impl DataSource for BrokenSource {
            fn load_people(&self) -> Result<Vec<Person>, DataError> {
                Err(DataError::BlankField {
                    path: "birthdays.json".into(),
                    index: 0,
                    field: "name",
                })
            }

            fn load_templates(&self) -> Result<Vec<MessageTemplate>, DataError> {
                Ok(vec![])
            }
        }

        let sender = FakeSender::default();
        let mut rng = StdRng::seed_from_u64(1);

        let err = congratulate(&BrokenSource, &sender, "-100", date(2024, 5, 10), &mut rng)
            .await
            .unwrap_err();

        assert!(matches!(err, RunError::Data(DataError::BlankField { .. })));
    }
}
