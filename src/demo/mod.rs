//! Interactive demonstrations of the control surface.

mod drawing;
mod inspector;

pub use drawing::Drawing;
pub use inspector::{describe, KeyInspector};

use crate::config::Config;
use crate::error::Result;
use crate::term::{setup_terminal, spawn_reader, Consumer, Session, StdoutDevice};

/// Run `consumer` on the controlling terminal until it quits.
///
/// The terminal is restored before this returns, whatever the outcome.
pub async fn run<C: Consumer<StdoutDevice>>(mut consumer: C, config: &Config) -> Result<()> {
    let (surface, guard) = setup_terminal(config)?;
    let mut session = Session::new(surface, config.escape_timeout());
    let result = session.run(spawn_reader(std::io::stdin()), &mut consumer).await;
    guard.restore();
    if let Err(err) = &result {
        tracing::error!(%err, "session ended with error");
    }
    result
}
