mod batch_predict;
mod collect;
mod predict;
mod train;
mod train_now;

pub use batch_predict::*;
pub use collect::*;
pub use predict::*;
pub use train::*;
pub use train_now::*;

use crate::config::{Opts, SubCommand};

pub trait SubCommandExtend {
    fn run(&self, opts: &Opts) -> anyhow::Result<()>;
}

impl SubCommandExtend for SubCommand {
    fn run(&self, opts: &Opts) -> anyhow::Result<()> {
        match self {
            SubCommand::TrainNow(cmd) => cmd.run(opts),
            SubCommand::Collect(cmd) => cmd.run(opts),
            SubCommand::Train(cmd) => cmd.run(opts),
            SubCommand::Predict(cmd) => cmd.run(opts),
            SubCommand::BatchPredict(cmd) => cmd.run(opts),
        }
    }
}
