use crate::{Effect, FetchFailure, Lifecycle, Msg, PollerState, NOT_FOUND_LIMIT};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: PollerState, msg: Msg) -> (PollerState, Vec<Effect>) {
    let effects = match msg {
        Msg::Tick => {
            // Placeholder handles wait for the caller to swap in the real one.
            if state.lifecycle() != Lifecycle::Polling || state.handle().is_placeholder() {
                return (state, Vec::new());
            }
            let seq = state.issue_seq();
            vec![Effect::FetchStatus {
                handle: state.handle().clone(),
                seq,
            }]
        }
        Msg::FetchSucceeded {
            handle,
            seq,
            snapshot,
        } => {
            if !state.accepts(&handle, seq) {
                return (state, Vec::new());
            }
            state.mark_applied(seq);
            let terminal = snapshot.status.is_terminal();
            let final_snapshot = terminal.then(|| snapshot.clone());
            state.apply_snapshot(snapshot);
            match final_snapshot {
                Some(snapshot) => {
                    state.set_lifecycle(Lifecycle::Finished);
                    vec![Effect::NotifyComplete(snapshot)]
                }
                None => Vec::new(),
            }
        }
        Msg::FetchFailed {
            handle,
            seq,
            failure,
        } => {
            if !state.accepts(&handle, seq) {
                return (state, Vec::new());
            }
            state.mark_applied(seq);
            match failure {
                FetchFailure::NotFound => {
                    if state.record_not_found() >= NOT_FOUND_LIMIT {
                        state.set_lifecycle(Lifecycle::Closed);
                        vec![Effect::NotifyClose]
                    } else {
                        Vec::new()
                    }
                }
                FetchFailure::Transient(detail) => {
                    state.set_transient_error(format!("Could not fetch progress: {detail}"));
                    Vec::new()
                }
            }
        }
        Msg::HandleChanged(handle) => {
            if state.lifecycle() != Lifecycle::Closed && handle != *state.handle() {
                state.reset_for(handle);
            }
            Vec::new()
        }
        Msg::CloseRequested => {
            if state.lifecycle() == Lifecycle::Closed {
                Vec::new()
            } else {
                state.set_lifecycle(Lifecycle::Closed);
                vec![Effect::NotifyClose]
            }
        }
    };

    (state, effects)
}
