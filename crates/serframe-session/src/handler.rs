//! Handler slots and isolated invocation.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use serframe_frame::Frame;

use crate::error::SessionError;
use crate::event::{ChannelFault, PinChange};

/// Error a handler may return to signal failure.
pub type CallbackError = Box<dyn std::error::Error + Send + Sync>;

/// Return type of every session handler.
pub type CallbackResult = Result<(), CallbackError>;

pub(crate) type FrameHandler = Arc<dyn Fn(Option<Frame>) -> CallbackResult + Send + Sync>;
pub(crate) type FaultHandler = Arc<dyn Fn(ChannelFault) -> CallbackResult + Send + Sync>;
pub(crate) type PinHandler = Arc<dyn Fn(PinChange) -> CallbackResult + Send + Sync>;
pub(crate) type DiagnosticHandler = Arc<dyn Fn(&SessionError) + Send + Sync>;

/// One slot per notification kind. Registering replaces the previous handler.
#[derive(Default, Clone)]
pub(crate) struct Handlers {
    pub(crate) frame: Option<FrameHandler>,
    pub(crate) error: Option<FaultHandler>,
    pub(crate) pin: Option<PinHandler>,
    pub(crate) diagnostic: Option<DiagnosticHandler>,
}

/// Run `f`, converting both a returned error and a panic into
/// [`SessionError::Callback`].
pub(crate) fn invoke_isolated<F>(handler: &'static str, f: F) -> Result<(), SessionError>
where
    F: FnOnce() -> CallbackResult,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(SessionError::Callback {
            handler,
            message: err.to_string(),
        }),
        Err(payload) => Err(SessionError::Callback {
            handler,
            message: format!("panicked: {}", panic_message(payload.as_ref())),
        }),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic payload"
    }
}
