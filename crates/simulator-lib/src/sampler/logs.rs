//! Synthetic application log generation
//!
//! A level is drawn first, then one of that level's message templates.
//! Placeholders such as `{pod_name}` are resolved through [`LogField`], so a
//! template can only reference fields that have a generation rule.

use crate::error::{Result, SimulatorError};
use crate::models::{LogEntry, LogLevel};
use crate::random::{choose, short_id, weighted_choice, RandomSource};
use chrono::{DateTime, Duration, Utc};

const LEVEL_WEIGHTS: [(LogLevel, f64); 4] = [
    (LogLevel::Info, 0.7),
    (LogLevel::Warning, 0.15),
    (LogLevel::Error, 0.1),
    (LogLevel::Debug, 0.05),
];

const INFO_TEMPLATES: &[&str] = &[
    "User {user_id} logged in successfully",
    "Processed request {request_id} in {time}ms",
    "Cache updated for key: {key}",
    "Database connection pool size: {size}",
    "Scheduled task {task_name} completed",
];

const WARNING_TEMPLATES: &[&str] = &[
    "High memory usage detected in pod {pod_name}",
    "Response time above threshold for endpoint {endpoint}",
    "Retrying connection to {service} (attempt {attempt})",
    "Cache miss rate increased to {rate}%",
];

const ERROR_TEMPLATES: &[&str] = &[
    "Failed to connect to database: {error}",
    "Payment processing failed for order {order_id}",
    "External API {api_name} returned 5xx error",
    "Kubernetes pod {pod_name} crash loop detected",
];

const DEBUG_TEMPLATES: &[&str] = &[
    "Entering function {function_name}",
    "Variable {var_name} value: {value}",
    "Starting processing of batch {batch_id}",
];

/// Maximum age of a generated log line
const MAX_AGE_SECS: i64 = 300;

const HOSTS: &[&str] = &["host-a", "host-b", "host-c"];

/// Message templates registered for `level`
pub fn templates(level: LogLevel) -> &'static [&'static str] {
    match level {
        LogLevel::Info => INFO_TEMPLATES,
        LogLevel::Warning => WARNING_TEMPLATES,
        LogLevel::Error => ERROR_TEMPLATES,
        LogLevel::Debug => DEBUG_TEMPLATES,
    }
}

/// A named value that may appear in a log template
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogField {
    UserId,
    RequestId,
    Time,
    Key,
    Size,
    TaskName,
    PodName,
    Endpoint,
    Service,
    Attempt,
    Rate,
    Error,
    OrderId,
    ApiName,
    FunctionName,
    VarName,
    Value,
    BatchId,
}

impl LogField {
    pub const ALL: [LogField; 18] = [
        LogField::UserId,
        LogField::RequestId,
        LogField::Time,
        LogField::Key,
        LogField::Size,
        LogField::TaskName,
        LogField::PodName,
        LogField::Endpoint,
        LogField::Service,
        LogField::Attempt,
        LogField::Rate,
        LogField::Error,
        LogField::OrderId,
        LogField::ApiName,
        LogField::FunctionName,
        LogField::VarName,
        LogField::Value,
        LogField::BatchId,
    ];

    /// Name used between braces in templates
    pub fn placeholder(&self) -> &'static str {
        match self {
            LogField::UserId => "user_id",
            LogField::RequestId => "request_id",
            LogField::Time => "time",
            LogField::Key => "key",
            LogField::Size => "size",
            LogField::TaskName => "task_name",
            LogField::PodName => "pod_name",
            LogField::Endpoint => "endpoint",
            LogField::Service => "service",
            LogField::Attempt => "attempt",
            LogField::Rate => "rate",
            LogField::Error => "error",
            LogField::OrderId => "order_id",
            LogField::ApiName => "api_name",
            LogField::FunctionName => "function_name",
            LogField::VarName => "var_name",
            LogField::Value => "value",
            LogField::BatchId => "batch_id",
        }
    }

    pub fn from_placeholder(name: &str) -> Option<Self> {
        LogField::ALL.iter().copied().find(|f| f.placeholder() == name)
    }

    /// Draw a value for this field
    pub fn generate(&self, rng: &mut dyn RandomSource) -> String {
        match self {
            LogField::UserId => format!("user-{}", rng.int_range(1000, 9999)),
            LogField::RequestId => short_id(rng),
            LogField::Time => rng.int_range(10, 500).to_string(),
            LogField::Key => format!("cache_key_{}", rng.int_range(1, 100)),
            LogField::Size => rng.int_range(10, 50).to_string(),
            LogField::TaskName => pick(rng, &["cleanup", "backup", "report"]),
            LogField::PodName => {
                let shard = pick(rng, &["a", "b", "c"]);
                format!("pod-{}-{}", shard, rng.int_range(1, 10))
            }
            LogField::Endpoint => {
                pick(rng, &["/api/users", "/api/payments", "/api/notifications"])
            }
            LogField::Service => pick(rng, &["redis", "database", "payment-gateway"]),
            LogField::Attempt => rng.int_range(1, 3).to_string(),
            LogField::Rate => format!("{:.1}", rng.uniform(5.0, 25.0)),
            LogField::Error => pick(
                rng,
                &[
                    "connection timeout",
                    "authentication failed",
                    "query execution error",
                ],
            ),
            LogField::OrderId => format!("order-{}", rng.int_range(10_000, 99_999)),
            LogField::ApiName => pick(rng, &["stripe", "sendgrid", "auth0"]),
            LogField::FunctionName => pick(
                rng,
                &["process_payment", "validate_user", "send_notification"],
            ),
            LogField::VarName => pick(rng, &["user_count", "total_amount", "retry_count"]),
            LogField::Value => rng.int_range(1, 100).to_string(),
            LogField::BatchId => rng.int_range(1, 1000).to_string(),
        }
    }
}

fn pick(rng: &mut dyn RandomSource, options: &[&str]) -> String {
    choose(rng, options).map(|s| s.to_string()).unwrap_or_default()
}

/// Fields referenced by `template`, in order of appearance
pub fn template_fields(template: &str) -> Result<Vec<LogField>> {
    let mut fields = Vec::new();
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(|| {
            SimulatorError::configuration(format!(
                "unterminated placeholder in log template {:?}",
                template
            ))
        })?;
        let name = &after[..close];
        let field = LogField::from_placeholder(name).ok_or_else(|| {
            SimulatorError::configuration(format!(
                "log template {:?} references unknown field {:?}",
                template, name
            ))
        })?;
        fields.push(field);
        rest = &after[close + 1..];
    }

    Ok(fields)
}

/// Substitute every placeholder in `template` with a generated value
pub fn render_template(template: &str, rng: &mut dyn RandomSource) -> Result<String> {
    let fields = template_fields(template)?;
    let mut message = String::with_capacity(template.len() + 16);
    let mut rest = template;

    for field in fields {
        let token = format!("{{{}}}", field.placeholder());
        // template_fields already located every token in order
        if let Some(pos) = rest.find(&token) {
            message.push_str(&rest[..pos]);
            message.push_str(&field.generate(rng));
            rest = &rest[pos + token.len()..];
        }
    }
    message.push_str(rest);

    Ok(message)
}

/// Produces synthetic [`LogEntry`]s
#[derive(Debug, Clone)]
pub struct LogSampler {
    services: Vec<String>,
    namespace: String,
}

impl LogSampler {
    pub fn new(services: Vec<String>, namespace: impl Into<String>) -> Result<Self> {
        if services.is_empty() {
            return Err(SimulatorError::configuration(
                "log sampler needs at least one service",
            ));
        }
        Ok(Self {
            services,
            namespace: namespace.into(),
        })
    }

    /// Generate one log entry timestamped up to five minutes before `now`
    pub fn sample_log(&self, rng: &mut dyn RandomSource, now: DateTime<Utc>) -> Result<LogEntry> {
        let level = weighted_choice(rng, &LEVEL_WEIGHTS)?;
        let template = choose(rng, templates(level)).ok_or_else(|| {
            SimulatorError::configuration(format!("no templates registered for {}", level))
        })?;
        let message = render_template(template, rng)?;

        let age = rng.int_range(0, MAX_AGE_SECS);
        let service = choose(rng, &self.services)
            .ok_or_else(|| SimulatorError::configuration("no services to log from"))?
            .clone();

        Ok(LogEntry {
            timestamp: now - Duration::seconds(age),
            level,
            message,
            service,
            trace_id: format!("trace-{}", short_id(rng)),
            span_id: format!("span-{}", rng.int_range(1000, 9999)),
            host: pick(rng, HOSTS),
            namespace: self.namespace.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::RngSource;

    const LEVELS: [LogLevel; 4] = [
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Debug,
    ];

    fn sampler() -> LogSampler {
        LogSampler::new(
            vec!["api-gateway".to_string(), "user-service".to_string()],
            "aiops-demo",
        )
        .unwrap()
    }

    #[test]
    fn test_every_template_uses_known_fields() {
        for level in LEVELS {
            assert!(!templates(level).is_empty());
            for template in templates(level) {
                let fields = template_fields(template).unwrap();
                assert!(!fields.is_empty(), "{}", template);
            }
        }
    }

    #[test]
    fn test_rendered_templates_have_no_placeholders() {
        let mut rng = RngSource::seeded(17);

        for level in LEVELS {
            for template in templates(level) {
                for _ in 0..50 {
                    let message = render_template(template, &mut rng).unwrap();
                    assert!(!message.contains('{'), "{}", message);
                    assert!(!message.contains('}'), "{}", message);
                }
            }
        }
    }

    #[test]
    fn test_render_substitutes_values() {
        let mut rng = RngSource::seeded(4);
        let message = render_template("Retrying connection to {service} (attempt {attempt})", &mut rng)
            .unwrap();

        assert!(message.starts_with("Retrying connection to "));
        let attempt: u32 = message
            .rsplit("attempt ")
            .next()
            .unwrap()
            .trim_end_matches(')')
            .parse()
            .unwrap();
        assert!((1..=3).contains(&attempt));
    }

    #[test]
    fn test_unknown_placeholder_is_configuration_error() {
        let mut rng = RngSource::seeded(4);

        let err = render_template("Disk {disk_name} is full", &mut rng).unwrap_err();
        assert!(matches!(err, SimulatorError::Configuration(_)));

        let err = render_template("Broken {user_id", &mut rng).unwrap_err();
        assert!(matches!(err, SimulatorError::Configuration(_)));
    }

    #[test]
    fn test_template_without_placeholders_is_unchanged() {
        let mut rng = RngSource::seeded(4);
        assert_eq!(render_template("plain text", &mut rng).unwrap(), "plain text");
    }

    #[test]
    fn test_placeholder_names_round_trip() {
        for field in LogField::ALL {
            assert_eq!(LogField::from_placeholder(field.placeholder()), Some(field));
        }
        assert_eq!(LogField::from_placeholder("nope"), None);
    }

    #[test]
    fn test_sampled_entry_shape() {
        let sampler = sampler();
        let now = Utc::now();

        for seed in 0..300 {
            let mut rng = RngSource::seeded(seed);
            let entry = sampler.sample_log(&mut rng, now).unwrap();

            assert!(entry.timestamp <= now);
            assert!(entry.timestamp >= now - Duration::seconds(300));
            assert!(templates(entry.level).len() >= 3);
            assert!(!entry.message.contains('{'));
            assert!(["api-gateway", "user-service"].contains(&entry.service.as_str()));
            assert!(entry.trace_id.starts_with("trace-"));
            assert_eq!(entry.trace_id.len(), "trace-".len() + 8);

            let span: u32 = entry.span_id.trim_start_matches("span-").parse().unwrap();
            assert!((1000..=9999).contains(&span));
            assert!(HOSTS.contains(&entry.host.as_str()));
            assert_eq!(entry.namespace, "aiops-demo");
        }
    }

    #[test]
    fn test_info_is_most_frequent_level() {
        let sampler = sampler();
        let mut rng = RngSource::seeded(8);
        let mut info = 0;
        let mut debug = 0;

        for _ in 0..2000 {
            match sampler.sample_log(&mut rng, Utc::now()).unwrap().level {
                LogLevel::Info => info += 1,
                LogLevel::Debug => debug += 1,
                _ => {}
            }
        }

        assert!(info > 1000, "info={}", info);
        assert!(debug < info / 4);
    }
}
