/// Position of the orchestrator within a frame. Stages run strictly in declaration order.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameStage {
    /// Between frames.
    Idle,
    WaitForSlot,
    UpdateSimulation,
    UpdateConstants,
    RecordCommands,
    Submit,
    Present,
    SignalFence,
}

impl FrameStage {
    pub fn name(self) -> &'static str {
        match self {
            FrameStage::Idle => "idle",
            FrameStage::WaitForSlot => "wait-for-slot",
            FrameStage::UpdateSimulation => "update-simulation",
            FrameStage::UpdateConstants => "update-constants",
            FrameStage::RecordCommands => "record-commands",
            FrameStage::Submit => "submit",
            FrameStage::Present => "present",
            FrameStage::SignalFence => "signal-fence",
        }
    }
}
