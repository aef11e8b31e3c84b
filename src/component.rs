//! Defines the Component trait, the unit of serialized work in WayCue. A
//! component owns its state outright and is driven from a single thread:
//! it consumes inputs from one channel, processes them in arrival order and
//! passes results to another. This is what keeps the guidance engine's
//! state confined to one execution context.

use log::{info, warn};
use std::fmt;
use std::sync::mpsc::{Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::error::GuideError;

#[derive(Debug)]
pub enum ComponentError {
    /// Flushing or persisting state at teardown failed.
    Teardown(GuideError),
}

impl fmt::Display for ComponentError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ComponentError::Teardown(e) => write!(f, "teardown failed: {}", e),
        }
    }
}

impl std::error::Error for ComponentError {}

impl From<GuideError> for ComponentError {
    fn from(value: GuideError) -> Self {
        Self::Teardown(value)
    }
}

///
/// A stage of work that runs on its own thread. Everything that mutates
/// long-lived guidance state from asynchronous inputs should implement
/// Component, so that it can be run by [`run_component`].
///
pub trait Component: ToString {
    type InData;
    type OutData;

    /// Converts an input of type InData into an output of type OutData
    fn convert(&mut self, input: Self::InData) -> Self::OutData;

    /// Cleans up once the input channel closes
    fn finalize(&mut self) -> Result<(), ComponentError>;
}

/// Runs the given Component on its own thread. On receiving data of type
/// InData on the input channel, the Component converts them to data of type
/// OutData and sends it to the output channel. The thread ends when every
/// sender of the input channel is gone.
pub fn run_component<C: Component + Send + 'static>(
    mut component: Box<C>,
    input: Receiver<<C as Component>::InData>,
    output: Sender<<C as Component>::OutData>,
) -> JoinHandle<()>
where
    <C as Component>::InData: Send + 'static,
    <C as Component>::OutData: Send + 'static,
{
    thread::spawn(move || {
        let mut listening = true;
        while let Ok(data) = input.recv() {
            let out_data = component.convert(data);
            // nobody reading results is fine, keep consuming input
            if listening && output.send(out_data).is_err() {
                warn!("{} : output receiver gone.", component.to_string());
                listening = false;
            }
        }

        if let Err(component_error) = component.finalize() {
            warn!(
                "{} : error during terminating : {component_error}.",
                component.to_string(),
            );
        }
        info!("{} : terminated.", component.to_string());
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::channel;

    /// Counts its inputs and fails on teardown when asked to
    struct MockComponent {
        seen: usize,
        fail_finalize: bool,
    }

    impl MockComponent {
        fn new() -> Self {
            Self {
                seen: 0,
                fail_finalize: false,
            }
        }
    }

    impl Component for MockComponent {
        type InData = i32;
        type OutData = i32;

        fn convert(&mut self, input: i32) -> i32 {
            self.seen += 1;
            input + 1
        }

        fn finalize(&mut self) -> Result<(), ComponentError> {
            if self.fail_finalize {
                Err(GuideError::Disconnected.into())
            } else {
                Ok(())
            }
        }
    }

    impl fmt::Display for MockComponent {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "MockComponent({})", self.seen)
        }
    }

    #[test]
    fn test_mock_component() {
        let (test_tx, block_rx) = channel::<i32>();
        let (block_tx, test_rx) = channel::<i32>();

        let handle = run_component(Box::new(MockComponent::new()), block_rx, block_tx);

        assert_eq!(test_tx.send(0), Ok(()));
        assert_eq!(test_rx.recv(), Ok(1));
        drop(test_tx);
        assert!(handle.join().is_ok());
    }

    #[test]
    fn test_chained_component() {
        let (test_tx, block_a_rx) = channel::<i32>();
        let (block_a_tx, block_b_rx) = channel::<i32>();
        let (block_b_tx, test_rx) = channel::<i32>();

        run_component(Box::new(MockComponent::new()), block_a_rx, block_a_tx);
        run_component(Box::new(MockComponent::new()), block_b_rx, block_b_tx);

        assert_eq!(test_tx.send(0), Ok(()));
        assert_eq!(test_rx.recv(), Ok(2));
    }

    #[test]
    fn keeps_consuming_without_reader() {
        let (test_tx, block_rx) = channel::<i32>();
        let (block_tx, test_rx) = channel::<i32>();
        drop(test_rx);

        let mut mock = MockComponent::new();
        mock.fail_finalize = true;
        let handle = run_component(Box::new(mock), block_rx, block_tx);
        for i in 0..3 {
            assert!(test_tx.send(i).is_ok());
        }
        drop(test_tx);
        // a failing teardown is logged, not propagated
        assert!(handle.join().is_ok());
    }

    #[test]
    fn teardown_error_display() {
        let e: ComponentError = GuideError::Disconnected.into();
        assert_eq!(e.to_string(), "teardown failed: channel disconnected");
    }
}
