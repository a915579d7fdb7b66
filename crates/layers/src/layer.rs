use serde::Serialize;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct LayerId(pub u64);

/// Lifecycle of an overlay whose data arrives asynchronously.
///
/// `Empty -> Populated` on data, `Empty -> FailedSilently` on fetch
/// failure. Neither terminal state returns to `Empty`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayState {
    #[default]
    Empty,
    Populated,
    FailedSilently,
}

impl OverlayState {
    /// Applies a successful load. Returns false if the transition is not
    /// allowed from the current state.
    pub fn populate(&mut self) -> bool {
        match self {
            OverlayState::Empty | OverlayState::Populated => {
                *self = OverlayState::Populated;
                true
            }
            OverlayState::FailedSilently => false,
        }
    }

    pub fn fail(&mut self) -> bool {
        match self {
            OverlayState::Empty => {
                *self = OverlayState::FailedSilently;
                true
            }
            OverlayState::Populated | OverlayState::FailedSilently => false,
        }
    }
}

pub trait Layer {
    fn id(&self) -> LayerId;
    fn state(&self) -> OverlayState;
}
