use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use crate::Pipeline;
use crate::cli::SubCommandExtend;
use crate::cluster::LloydKMeans;
use crate::config::{ClusterOptions, FeatureOptions, Opts};

#[derive(Parser, Debug, Clone)]
pub struct TrainCommand {
    #[command(flatten)]
    pub feature: FeatureOptions,
    #[command(flatten)]
    pub cluster: ClusterOptions,
    /// 聚类数量
    pub k: usize,
    /// 训练数据 CSV 文件
    pub dataset: PathBuf,
    /// 聚类中心输出文件
    pub centroids: PathBuf,
}

impl SubCommandExtend for TrainCommand {
    fn run(&self, _opts: &Opts) -> Result<()> {
        let pipeline = Pipeline::new((&self.feature).into())
            .clusterer(LloydKMeans { max_iter: self.cluster.max_iter, verbose: true });
        pipeline.train(&self.dataset, self.k, &self.centroids)?;
        Ok(())
    }
}
