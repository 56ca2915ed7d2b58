use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use serde::Serialize;

use crate::Pipeline;
use crate::cli::SubCommandExtend;
use crate::config::{FeatureOptions, Opts, RouteOptions, ScanOptions};
use crate::route::{RouteMode, Router};
use crate::scan::{ExtensionFilter, ImageRecord};

#[derive(Parser, Debug, Clone)]
pub struct BatchPredictCommand {
    #[command(flatten)]
    pub feature: FeatureOptions,
    #[command(flatten)]
    pub scan: ScanOptions,
    #[command(flatten)]
    pub route: RouteOptions,
    /// 聚类中心文件
    pub centroids: PathBuf,
    /// 图片所在目录
    pub images: PathBuf,
    /// 图片将被移动到此目录下的 `<cluster>/` 子目录中
    pub output: PathBuf,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for BatchPredictCommand {
    fn run(&self, _opts: &Opts) -> Result<()> {
        let pipeline = Pipeline::new((&self.feature).into())
            .filter(ExtensionFilter::parse(&self.scan.suffix));
        let router = Router::new(self.route.siblings(), self.route.correlation(), RouteMode::Move);
        let records = pipeline.batch_predict(&self.centroids, &self.images, &router, &self.output)?;
        print_result(&records, self.output_format)
    }
}

#[derive(Serialize)]
struct Prediction<'a> {
    file: &'a str,
    cluster: usize,
}

fn print_result(records: &[ImageRecord], format: OutputFormat) -> Result<()> {
    let result = records
        .iter()
        .filter_map(|r| r.cluster.map(|cluster| Prediction { file: &r.file_name, cluster }))
        .collect::<Vec<_>>();
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&result)?)
        }
        OutputFormat::Table => {
            for p in result {
                println!("{}\t{}", p.cluster, p.file);
            }
        }
    }
    Ok(())
}

#[derive(ValueEnum, Debug, Clone, Copy)]
pub enum OutputFormat {
    Json,
    Table,
}
