use serde::{Deserialize, Serialize};

use crate::kernel::event::{RenderQualityEvent, ResultRecord};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TelemetryEvent {
    /// The worker finished one WorkUnit.
    ResultRecorded(ResultRecord),

    /// The render-quality observer reported one frame.
    RenderQuality(RenderQualityEvent),

    /// The ingress queue rejected a WorkUnit.
    UnitDropped,
}
