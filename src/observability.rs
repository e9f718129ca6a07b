use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("groqchat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("groqchat.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("groqchat.client.request_duration_seconds");

pub(crate) static CHAT_COMPLETIONS: Counter = Counter::new("groqchat.chat.completions");
pub(crate) static CHAT_EMPTY_RESPONSES: Counter = Counter::new("groqchat.chat.empty_responses");
pub(crate) static CHAT_TOKENS: Counter = Counter::new("groqchat.chat.tokens");

pub(crate) static HISTORY_WRITES: Counter = Counter::new("groqchat.history.writes");
pub(crate) static HISTORY_WRITE_ERRORS: Counter = Counter::new("groqchat.history.write_errors");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&CHAT_COMPLETIONS);
    collector.register_counter(&CHAT_EMPTY_RESPONSES);
    collector.register_counter(&CHAT_TOKENS);

    collector.register_counter(&HISTORY_WRITES);
    collector.register_counter(&HISTORY_WRITE_ERRORS);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_register_with_a_collector() {
        let collector = Collector::new();
        register_biometrics(collector);
        HISTORY_WRITES.click();
        CHAT_TOKENS.count(10);
        CLIENT_REQUEST_DURATION.add(0.25);
    }
}
