/// A readiness event reported by the poller.
///
/// The poller merges every kernel notification for one registration into a
/// single `Event`, so a token appears at most once per poll cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Event {
    /// Token the descriptor was registered with.
    pub(crate) token: usize,

    /// The descriptor can be read (or accepted) without blocking.
    ///
    /// Hang-ups and errors are folded in here so the read path observes them.
    pub(crate) readable: bool,

    /// The descriptor can be written without blocking.
    pub(crate) writable: bool,
}

/// Folds a notification into `events`, merging it with an existing entry for the same token.
pub(crate) fn merge_event(events: &mut Vec<Event>, token: usize, readable: bool, writable: bool) {
    if let Some(e) = events.iter_mut().find(|e| e.token == token) {
        e.readable |= readable;
        e.writable |= writable;
    } else {
        events.push(Event {
            token,
            readable,
            writable,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn notifications_for_one_token_are_merged() {
        let mut events = Vec::new();

        merge_event(&mut events, 3, true, false);
        merge_event(&mut events, 7, false, true);
        merge_event(&mut events, 3, false, true);

        assert_eq!(
            events,
            vec![
                Event {
                    token: 3,
                    readable: true,
                    writable: true
                },
                Event {
                    token: 7,
                    readable: false,
                    writable: true
                },
            ]
        );
    }
}
