use crate::navigation::StackAction;
use crate::standups::detail::DetailAction;
use crate::standups::list::ListAction;
use crate::standups::record::RecordAction;

use super::state::PathState;

#[derive(Debug, Clone, PartialEq)]
pub enum AppAction {
    Path(StackAction<PathState, PathAction>),
    StandupsList(ListAction),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathAction {
    Detail(DetailAction),
    Record(RecordAction),
}

impl PathAction {
    pub fn as_detail(&self) -> Option<&DetailAction> {
        match self {
            PathAction::Detail(action) => Some(action),
            PathAction::Record(_) => None,
        }
    }

    pub fn as_record(&self) -> Option<&RecordAction> {
        match self {
            PathAction::Record(action) => Some(action),
            PathAction::Detail(_) => None,
        }
    }
}
