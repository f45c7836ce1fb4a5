//! Module interfaces
//!
//! Cyclic modules of `arm_exec`, such as playback, implement [`State`] so the main loop can drive
//! them the same way: initialise once, then call `proc` once per cycle.

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// The module's internal state.
pub trait State {
    /// Data needed to set the module up, usually its parameters.
    type InitData;
    type InitError;

    /// Data consumed by each cycle. Modules driven only by their own state use `()`.
    type InputData;
    /// Data produced by each cycle, to be emitted by the caller.
    type OutputData;
    /// Summary of what happened during the cycle.
    type StatusReport;
    type ProcError;

    /// Initialise the module, replacing any previous state.
    fn init(&mut self, init_data: Self::InitData) -> Result<(), Self::InitError>;

    /// Run one cycle of the module.
    ///
    /// A `ProcError` only describes the failed cycle, the caller is expected to keep cycling.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
