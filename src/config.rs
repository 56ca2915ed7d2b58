use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::cli::*;
use crate::route::{NameCorrelation, SameStem, StripAffix};

/// 图片解码后的通道数
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channels {
    /// 灰度
    Grey,
    /// 灰度 + 透明度
    GreyAlpha,
    Rgb,
    Rgba,
}

impl Channels {
    pub fn count(self) -> usize {
        match self {
            Channels::Grey => 1,
            Channels::GreyAlpha => 2,
            Channels::Rgb => 3,
            Channels::Rgba => 4,
        }
    }
}

/// 特征向量的构造参数
///
/// 同一个模型的训练和预测必须使用相同的配置，修改任意一项都会使已保存的 CSV 失效
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureConfig {
    pub width: u32,
    pub height: u32,
    pub channels: Channels,
    pub normalize: bool,
}

impl FeatureConfig {
    /// 特征向量长度
    pub fn dims(&self) -> usize {
        self.width as usize * self.height as usize * self.channels.count()
    }
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self { width: 20, height: 20, channels: Channels::Grey, normalize: true }
    }
}

impl From<&FeatureOptions> for FeatureConfig {
    fn from(opts: &FeatureOptions) -> Self {
        Self {
            width: opts.width,
            height: opts.height,
            channels: opts.channels,
            normalize: !opts.no_normalize,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct FeatureOptions {
    /// 图片缩放后的宽度
    #[arg(long, value_name = "N", default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
    pub width: u32,
    /// 图片缩放后的高度
    #[arg(long, value_name = "N", default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
    pub height: u32,
    /// 解码时转换成的通道格式
    #[arg(long, value_enum, default_value_t = Channels::Grey)]
    pub channels: Channels,
    /// 像素值保持 0 ~ 255，不归一化到 0 ~ 1
    #[arg(long)]
    pub no_normalize: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ScanOptions {
    /// 扫描的文件后缀名，多个后缀用逗号分隔，区分大小写
    #[arg(short, long, default_value = "jpg,jpeg,png")]
    pub suffix: String,
}

#[derive(Args, Debug, Clone)]
pub struct RouteOptions {
    /// 与图片一起移动的同组文件后缀名，多个后缀用逗号分隔
    /// 为空时只移动图片本身
    #[arg(long, value_name = "SUFFIXES", default_value = "", verbatim_doc_comment)]
    pub siblings: String,
    /// 缩略图文件名中的附加后缀，推导其他同组文件名时会被去掉
    /// 为空时同组文件与图片使用相同的文件名
    #[arg(long, default_value = "_thumbnail", verbatim_doc_comment)]
    pub affix: String,
}

impl RouteOptions {
    pub fn siblings(&self) -> Vec<String> {
        split_list(&self.siblings)
    }

    pub fn correlation(&self) -> Box<dyn NameCorrelation> {
        if self.affix.is_empty() {
            Box::new(SameStem)
        } else {
            Box::new(StripAffix::new(self.affix.clone()))
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ClusterOptions {
    /// 最大迭代次数
    #[arg(
        short,
        long,
        default_value_t = 100,
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub max_iter: usize,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "imcluster", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 直接对目录中的图片聚类，不保存训练数据
    TrainNow(TrainNowCommand),
    /// 提取图片特征并追加到训练数据 CSV
    Collect(CollectCommand),
    /// 使用训练数据 CSV 聚类并保存中心点
    Train(TrainCommand),
    /// 预测单张图片所属的聚类
    Predict(PredictCommand),
    /// 预测目录中所有图片的聚类，并将文件移动到对应的聚类目录
    BatchPredict(BatchPredictCommand),
}

/// 解析逗号分隔的列表，忽略空项
pub fn split_list(s: &str) -> Vec<String> {
    s.split(',').map(str::trim).filter(|s| !s.is_empty()).map(str::to_owned).collect()
}
