use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::info;

use crate::Pipeline;
use crate::cli::SubCommandExtend;
use crate::cluster::LloydKMeans;
use crate::config::{ClusterOptions, FeatureOptions, Opts, RouteOptions, ScanOptions};
use crate::route::{RouteMode, Router};
use crate::scan::ExtensionFilter;

#[derive(Parser, Debug, Clone)]
pub struct TrainNowCommand {
    #[command(flatten)]
    pub feature: FeatureOptions,
    #[command(flatten)]
    pub scan: ScanOptions,
    #[command(flatten)]
    pub cluster: ClusterOptions,
    #[command(flatten)]
    pub route: RouteOptions,
    /// 聚类数量
    pub k: usize,
    /// 聚类中心输出文件
    pub centroids: PathBuf,
    /// 图片所在目录
    pub images: PathBuf,
    /// 将图片复制到此目录下的 `<cluster>/` 子目录中
    pub output: Option<PathBuf>,
}

impl SubCommandExtend for TrainNowCommand {
    fn run(&self, _opts: &Opts) -> Result<()> {
        let pipeline = Pipeline::new((&self.feature).into())
            .filter(ExtensionFilter::parse(&self.scan.suffix))
            .clusterer(LloydKMeans { max_iter: self.cluster.max_iter, verbose: true });

        let router = Router::new(self.route.siblings(), self.route.correlation(), RouteMode::Copy);
        let route = self.output.as_deref().map(|output| (&router, output));

        let outcome = pipeline.train_now(&self.images, self.k, &self.centroids, route)?;
        info!("训练完成，共 {} 张图片", outcome.records.len());
        Ok(())
    }
}
