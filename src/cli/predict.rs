use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::Pipeline;
use crate::cli::SubCommandExtend;
use crate::config::{FeatureOptions, Opts};

#[derive(Parser, Debug, Clone)]
pub struct PredictCommand {
    #[command(flatten)]
    pub feature: FeatureOptions,
    /// 聚类中心文件
    pub centroids: PathBuf,
    /// 被预测的图片路径
    pub image: PathBuf,
}

impl SubCommandExtend for PredictCommand {
    fn run(&self, _opts: &Opts) -> Result<()> {
        let pipeline = Pipeline::new((&self.feature).into());
        let cluster = pipeline.predict(&self.centroids, &self.image)?;
        println!("{}", cluster);
        Ok(())
    }
}
