use std::fmt::Write as _;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

pub const LOG_ENV: &str = "ENDORSHIM_LOG";

/// Renders events as GitHub Actions workflow commands.
struct WorkflowCommands;

impl<S, N> FormatEvent<S, N> for WorkflowCommands
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> std::fmt::Result {
        let mut message = String::new();
        ctx.field_format()
            .format_fields(Writer::new(&mut message), event)?;

        match command_for(*event.metadata().level()) {
            Some(command) => writeln!(writer, "::{command}::{}", escape_data(&message)),
            None => writeln!(writer, "{message}"),
        }
    }
}

fn command_for(level: Level) -> Option<&'static str> {
    match level {
        Level::ERROR => Some("error"),
        Level::WARN => Some("warning"),
        Level::INFO => None,
        _ => Some("debug"),
    }
}

/// Workflow command data must stay on one line.
fn escape_data(message: &str) -> String {
    let mut escaped = String::with_capacity(message.len());
    for c in message.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            '\r' => escaped.push_str("%0D"),
            '\n' => escaped.push_str("%0A"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Install the global subscriber. Filter comes from `ENDORSHIM_LOG`, default `info`.
pub fn init(in_actions: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    if in_actions {
        // the runner picks workflow commands up from stdout
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stdout)
            .event_format(WorkflowCommands)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .without_time()
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_levels_map_to_commands() {
        assert_eq!(command_for(Level::ERROR), Some("error"));
        assert_eq!(command_for(Level::WARN), Some("warning"));
        assert_eq!(command_for(Level::INFO), None);
        assert_eq!(command_for(Level::DEBUG), Some("debug"));
        assert_eq!(command_for(Level::TRACE), Some("debug"));
    }

    #[test]
    fn test_escape_data() {
        assert_eq!(escape_data("100% done\nnext"), "100%25 done%0Anext");
        assert_eq!(escape_data("plain"), "plain");
    }
}
