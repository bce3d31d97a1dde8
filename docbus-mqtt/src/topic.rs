//! Topic filter matching.
//!
//! Subscriptions are routed to their channels on the client side, so the
//! broker's filter semantics are mirrored here: `+` matches exactly one
//! level, a trailing `#` matches any number of remaining levels (including
//! none), and filters starting with a wildcard never match topics whose
//! first level starts with `$`.

/// Returns true when `topic` matches the subscription `filter`.
pub fn topic_matches(filter: &str, topic: &str) -> bool {
    if (filter.starts_with('+') || filter.starts_with('#')) && topic.starts_with('$') {
        return false;
    }

    let mut filter_levels = filter.split('/');
    let mut topic_levels = topic.split('/');
    loop {
        match (filter_levels.next(), topic_levels.next()) {
            // A trailing `#` swallows the rest of the topic; anywhere else
            // it is not a valid wildcard.
            (Some("#"), _) => return filter_levels.next().is_none(),
            (Some("+"), Some(_)) => {}
            (Some(expected), Some(level)) if expected == level => {}
            (None, None) => return true,
            _ => return false,
        }
    }
}
