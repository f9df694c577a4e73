use crate::queries::{TopicQuery, PLACEHOLDER_TOPIC_NAME};

/// Whether a query should produce a live subscription at all.
/// Hidden queries and queries without a real topic name never stream.
pub fn should_stream(query: &TopicQuery) -> bool {
    if query.hide() {
        return false;
    }

    let topic_name = query.topic_name();
    if topic_name.trim().is_empty() {
        return false;
    }

    topic_name != PLACEHOLDER_TOPIC_NAME
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_query_does_not_stream() {
        let query = TopicQuery::new("A", "orders").hidden(true);

        assert!(!should_stream(&query));
    }

    #[test]
    fn unconfigured_topic_does_not_stream() {
        for topic_name in ["", "   ", "\t\n", PLACEHOLDER_TOPIC_NAME] {
            let query = TopicQuery::new("A", topic_name);

            assert!(!should_stream(&query), "topic {topic_name:?} should not stream");
        }
    }

    #[test]
    fn configured_topic_streams() {
        for topic_name in ["orders", "topic_name", " orders ", "TOPIC_NAME_2"] {
            let query = TopicQuery::new("A", topic_name);

            assert!(should_stream(&query), "topic {topic_name:?} should stream");
        }
    }

    #[test]
    fn hide_wins_over_valid_topic() {
        let query = TopicQuery::with_default_topic("A").hidden(true);

        assert!(!should_stream(&query));
    }
}
