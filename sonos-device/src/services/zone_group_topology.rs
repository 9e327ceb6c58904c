//! ZoneGroupTopology sub-service: read-only view of how speakers are grouped.

use crate::action::ActionResponse;
use crate::command::{define_command, Command};
use crate::dispatcher::ActionInvoker;
use crate::error::Result;

define_command! {
    command: GetZoneGroupState,
    action: "GetZoneGroupState",
    service: ZoneGroupTopology,
    params: {},
}

define_command! {
    command: GetZoneGroupAttributes,
    action: "GetZoneGroupAttributes",
    service: ZoneGroupTopology,
    params: {},
}

#[derive(Debug, Clone)]
pub struct ZoneGroupTopology {
    invoker: ActionInvoker,
}

impl ZoneGroupTopology {
    pub(crate) fn new(invoker: ActionInvoker) -> Self {
        Self { invoker }
    }

    /// `ZoneGroupState` in the response is an escaped XML document
    pub async fn get_zone_group_state(&self) -> Result<ActionResponse> {
        self.invoker
            .invoke(GetZoneGroupState::default().into_action())
            .await
    }

    pub async fn get_zone_group_attributes(&self) -> Result<ActionResponse> {
        self.invoker
            .invoke(GetZoneGroupAttributes::default().into_action())
            .await
    }
}
