use crate::navigation::StackState;
use crate::standups::detail::DetailState;
use crate::standups::list::StandupsListState;
use crate::standups::record::RecordState;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub path: StackState<PathState>,
    pub standups_list: StandupsListState,
}

/// Screens that can be pushed on the stack.
#[derive(Debug, Clone, PartialEq)]
pub enum PathState {
    Detail(DetailState),
    Record(RecordState),
}

impl PathState {
    pub fn as_detail_mut(&mut self) -> Option<&mut DetailState> {
        match self {
            PathState::Detail(detail) => Some(detail),
            PathState::Record(_) => None,
        }
    }

    pub fn as_record_mut(&mut self) -> Option<&mut RecordState> {
        match self {
            PathState::Record(record) => Some(record),
            PathState::Detail(_) => None,
        }
    }
}
