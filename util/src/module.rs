//! Module interfaces
//!
//! Every module processed by the cyclic executive implements the [`State`]
//! trait: it is initialised once with its parameter file, then stepped once
//! per 30 Hz cycle with that cycle's input data.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// MODULE STATE
// ---------------------------------------------------------------------------

/// The module's internal state.
pub trait State {
    /// Data required during initialisation, normally the name of the
    /// module's parameter file.
    type InitData;
    /// An error which can occur during initialisation.
    type InitError;

    /// Data read by the module at the start of each cycle.
    type InputData;
    /// Data produced by the module each cycle.
    type OutputData;
    /// Flags and monitoring quantities describing what happened during the
    /// cycle.
    type StatusReport;
    /// An error which can occur during cyclic processing.
    type ProcError;

    /// Initialise the module before the first cycle.
    fn init(&mut self, init_data: Self::InitData, session: &Session)
        -> Result<(), Self::InitError>;

    /// Step the module by one cycle, producing its output data and a status
    /// report for this cycle.
    fn proc(&mut self, input_data: &Self::InputData)
        -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError>;
}
