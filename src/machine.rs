//! This module defines the `Machine` struct, which simulates a single-tape deterministic
//! Turing machine. It handles input loading, the step/run loop, and halting classification.

use log::{debug, trace};

use crate::analyzer::check_signature;
use crate::history::{Configuration, History};
use crate::tape::{Tape, Window};
use crate::transition::TransitionTable;
use crate::types::{
    default_reject_states, Definition, Direction, ExecutionStatus, Signature, TuringMachineError,
};

/// A hook handed every configuration a run records before stepping.
///
/// The first argument is the 1-based number of the step about to run.
pub type TraceHook<'a> = &'a mut dyn FnMut(usize, &Configuration);

/// Represents a single-tape deterministic Turing machine.
///
/// A machine owns its static signature, its transition table, and the mutable
/// execution state: current state, tape, step counter, and history. Nothing is
/// shared between machines.
#[derive(Debug, Clone)]
pub struct Machine {
    signature: Signature,
    table: TransitionTable,
    state: String,
    tape: Option<Tape>,
    window: Window,
    step_count: usize,
    history: History,
}

impl Machine {
    /// Creates a machine from its formal components.
    ///
    /// The reject set is the default sentinel, see [`Machine::with_reject_states`].
    ///
    /// # Returns
    ///
    /// * `Err(TuringMachineError::ValidationError)` if the components break a machine
    ///   invariant, for example a start state that is not declared or an input
    ///   alphabet containing the blank symbol.
    pub fn new(
        states: impl IntoIterator<Item = impl Into<String>>,
        input_alphabet: impl IntoIterator<Item = char>,
        tape_alphabet: impl IntoIterator<Item = char>,
        start_state: impl Into<String>,
        accept_states: impl IntoIterator<Item = impl Into<String>>,
        blank: char,
    ) -> Result<Self, TuringMachineError> {
        Self::from_signature(Signature {
            states: states.into_iter().map(Into::into).collect(),
            input_alphabet: input_alphabet.into_iter().collect(),
            tape_alphabet: tape_alphabet.into_iter().collect(),
            start_state: start_state.into(),
            accept_states: accept_states.into_iter().map(Into::into).collect(),
            reject_states: default_reject_states(),
            blank,
        })
    }

    /// Creates a machine with an empty transition table from a signature.
    pub fn from_signature(signature: Signature) -> Result<Self, TuringMachineError> {
        check_signature(&signature)?;

        Ok(Self {
            state: signature.start_state.clone(),
            signature,
            table: TransitionTable::new(),
            tape: None,
            window: Window::default(),
            step_count: 0,
            history: History::new(),
        })
    }

    /// Creates a machine from a definition, populating the transition table from its rules.
    pub fn from_definition(definition: &Definition) -> Result<Self, TuringMachineError> {
        let mut machine = Self::from_signature(definition.signature.clone())?;
        for rule in &definition.rules {
            machine.add_transition(
                rule.state.as_str(),
                rule.read,
                rule.next_state.as_str(),
                rule.write,
                rule.direction,
            );
        }

        debug!(
            "Built machine '{}' with {} transitions",
            definition.name,
            machine.table.len()
        );
        Ok(machine)
    }

    /// Replaces the reject set, re-checking the signature.
    pub fn with_reject_states(
        mut self,
        states: impl IntoIterator<Item = impl Into<String>>,
    ) -> Result<Self, TuringMachineError> {
        self.signature.reject_states = states.into_iter().map(Into::into).collect();
        check_signature(&self.signature)?;
        Ok(self)
    }

    /// Adds or replaces the transition for `(state, read)`.
    pub fn add_transition(
        &mut self,
        state: impl Into<String>,
        read: char,
        next_state: impl Into<String>,
        write: char,
        direction: Direction,
    ) {
        self.table.add(state, read, next_state, write, direction);
    }

    /// Sets the window used to render the tape in configurations.
    pub fn set_window(&mut self, window: Window) {
        self.window = window;
    }

    /// Loads an input string, resetting the machine for a fresh run.
    ///
    /// Every character must belong to the input alphabet or be the blank symbol.
    /// On success the tape holds `input` from position 0 with the head at 0, the
    /// current state is the start state, and the history is empty.
    pub fn load_input(&mut self, input: &str) -> Result<(), TuringMachineError> {
        if let Some((position, symbol)) = input.chars().enumerate().find(|&(_, symbol)| {
            symbol != self.signature.blank && !self.signature.input_alphabet.contains(&symbol)
        }) {
            return Err(TuringMachineError::InvalidInputSymbol { symbol, position });
        }

        self.tape = Some(Tape::from_input(input, self.signature.blank));
        self.state = self.signature.start_state.clone();
        self.step_count = 0;
        self.history.clear();

        debug!("Loaded input {:?}", input);
        Ok(())
    }

    /// Executes a single step.
    ///
    /// # Returns
    ///
    /// * `Ok(ExecutionStatus::Accepted)` if the current state is accepting.
    /// * `Ok(ExecutionStatus::Rejected)` if the current state is rejecting, or if no
    ///   transition exists for the current state and symbol.
    /// * `Ok(ExecutionStatus::Continuing)` once a transition has been applied.
    /// * `Err(TuringMachineError::NotInitialized)` if no input was loaded.
    ///
    /// The tape is left untouched whenever the result is not `Continuing`.
    pub fn step(&mut self) -> Result<ExecutionStatus, TuringMachineError> {
        let tape = self
            .tape
            .as_mut()
            .ok_or(TuringMachineError::NotInitialized)?;

        if self.signature.is_accepting(&self.state) {
            return Ok(ExecutionStatus::Accepted);
        }
        if self.signature.is_rejecting(&self.state) {
            return Ok(ExecutionStatus::Rejected);
        }

        let symbol = tape.read();
        let Some(transition) = self.table.lookup(&self.state, symbol) else {
            debug!(
                "No transition for state {} and symbol {:?}",
                self.state, symbol
            );
            return Ok(ExecutionStatus::Rejected);
        };

        trace!(
            "{} {:?} -> {} {:?} {}",
            self.state,
            symbol,
            transition.next_state,
            transition.write,
            transition.direction
        );

        tape.write(transition.write);
        tape.move_head(transition.direction);
        self.state.clone_from(&transition.next_state);
        self.step_count += 1;

        Ok(ExecutionStatus::Continuing)
    }

    /// Runs the machine until it halts or `max_steps` steps have been applied.
    ///
    /// Before every step the current configuration is recorded and, if given, passed
    /// to `trace`. A halting run also records its final configuration. When the budget
    /// runs out the result is `StepLimitExceeded` with the history recorded so far;
    /// the machine keeps its state and tape, so calling `run` again resumes it.
    ///
    /// The returned history is a copy of [`Machine::history`], which stays on the
    /// machine until the next `run` or `load_input`. Callers that only need the
    /// accessor can drop the returned value right away.
    pub fn run(
        &mut self,
        max_steps: usize,
        mut trace: Option<TraceHook<'_>>,
    ) -> Result<(ExecutionStatus, History), TuringMachineError> {
        if self.tape.is_none() {
            return Err(TuringMachineError::NotInitialized);
        }

        self.history.clear();
        let mut steps = 0;

        while steps < max_steps {
            let configuration = self.configuration()?;
            if let Some(hook) = trace.as_mut() {
                hook(steps + 1, &configuration);
            }
            self.history.record(configuration);

            let status = self.step()?;
            if status.is_terminal() {
                let configuration = self.configuration()?;
                self.history.record(configuration);
                debug!("Machine halted: {} after {} steps", status, self.step_count);
                return Ok((status, self.history.clone()));
            }

            steps += 1;
        }

        debug!("Step limit of {} reached", max_steps);
        Ok((ExecutionStatus::StepLimitExceeded, self.history.clone()))
    }

    /// Returns the current configuration.
    pub fn configuration(&self) -> Result<Configuration, TuringMachineError> {
        let tape = self
            .tape
            .as_ref()
            .ok_or(TuringMachineError::NotInitialized)?;

        Ok(Configuration {
            state: self.state.clone(),
            tape: tape.render(self.window),
            head: tape.head(),
        })
    }

    /// Returns the current state.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the tape, if an input has been loaded.
    pub fn tape(&self) -> Option<&Tape> {
        self.tape.as_ref()
    }

    /// Returns the number of transitions applied since the last `load_input`.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    /// Returns the history recorded by the most recent run.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Returns the static configuration of the machine.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Returns the transition table.
    pub fn transitions(&self) -> &TransitionTable {
        &self.table
    }

    /// Returns `true` if the current state is accepting or rejecting.
    pub fn is_halted(&self) -> bool {
        self.signature.is_halting(&self.state)
    }
}
