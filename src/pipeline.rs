use std::path::Path;

use log::{info, warn};

use crate::cluster::{self, Clusterer, LloydKMeans};
use crate::config::FeatureConfig;
use crate::error::{Error, Result};
use crate::feature::{self, FeatureVector};
use crate::route::{RouteReport, Router};
use crate::scan::{self, ExtensionFilter, ImageRecord, ScanReport};
use crate::store;

/// 训练得到的模型以及每张图片的聚类结果
#[derive(Debug, Clone)]
pub struct TrainOutcome {
    pub records: Vec<ImageRecord>,
    pub centroids: Vec<FeatureVector>,
    pub route: Option<RouteReport>,
}

/// 特征提取 → 聚类 → 保存 → 预测 的完整流程
pub struct Pipeline {
    config: FeatureConfig,
    filter: ExtensionFilter,
    clusterer: Box<dyn Clusterer>,
}

impl Pipeline {
    pub fn new(config: FeatureConfig) -> Self {
        Self {
            config,
            filter: ExtensionFilter::parse("jpg,jpeg,png"),
            clusterer: Box::new(LloydKMeans::default()),
        }
    }

    /// 设置扫描目录时使用的后缀白名单
    pub fn filter(mut self, filter: ExtensionFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn clusterer(mut self, clusterer: impl Clusterer + 'static) -> Self {
        self.clusterer = Box::new(clusterer);
        self
    }

    /// 扫描目录，给定 `router` 时跳过其中的同组文件
    pub fn scan(
        &self,
        dir: &Path,
        router: Option<&Router>,
    ) -> Result<(Vec<ImageRecord>, ScanReport)> {
        scan::scan(dir, &self.filter, &self.config, router)
    }

    fn scan_nonempty(&self, dir: &Path, router: Option<&Router>) -> Result<Vec<ImageRecord>> {
        let (records, _) = self.scan(dir, router)?;
        if records.is_empty() {
            return Err(Error::NoImages { path: dir.to_path_buf() });
        }
        Ok(records)
    }

    /// 直接对目录中的图片聚类，不保存训练数据
    ///
    /// 给定 `route` 时，先将图片（及同组文件）复制到 `<output>/<cluster>/`，再写入聚类中心
    pub fn train_now(
        &self,
        images: &Path,
        k: usize,
        centroids: &Path,
        route: Option<(&Router, &Path)>,
    ) -> Result<TrainOutcome> {
        let mut records = self.scan_nonempty(images, route.map(|(router, _)| router))?;

        let points = records.iter().map(|r| r.vector.clone()).collect::<Vec<_>>();
        let clustering = cluster::train(&*self.clusterer, &points, k)?;
        for (record, cluster) in records.iter_mut().zip(clustering.assignments) {
            record.cluster = Some(cluster);
        }

        let route = match route {
            Some((router, output)) => Some(router.route(images, output, assignments(&records))?),
            None => None,
        };

        store::write_centroids(centroids, &clustering.centroids)?;
        Ok(TrainOutcome { records, centroids: clustering.centroids, route })
    }

    /// 提取目录中图片的特征并追加到训练数据，返回追加的行数
    pub fn collect(&self, images: &Path, dataset: &Path) -> Result<usize> {
        let records = self.scan_nonempty(images, None)?;
        store::append(dataset, records.iter().map(|r| &r.vector))
    }

    /// 使用训练数据聚类并写入聚类中心
    pub fn train(&self, dataset: &Path, k: usize, centroids: &Path) -> Result<Vec<FeatureVector>> {
        let points = store::load(dataset, self.config.dims())?;
        if points.is_empty() {
            return Err(Error::NoImages { path: dataset.to_path_buf() });
        }
        let clustering = cluster::train(&*self.clusterer, &points, k)?;
        store::write_centroids(centroids, &clustering.centroids)?;
        Ok(clustering.centroids)
    }

    /// 预测单张图片所属的聚类
    pub fn predict(&self, centroids: &Path, image: &Path) -> Result<usize> {
        let vector = feature::build(image, &self.config)?;
        let centroids = store::read_centroids(centroids, self.config.dims())?;
        self.clusterer.nearest(&centroids, &vector)
    }

    /// 预测目录中所有图片的聚类，并将文件（及同组文件）移动到 `<output>/<cluster>/`
    pub fn batch_predict(
        &self,
        centroids: &Path,
        images: &Path,
        router: &Router,
        output: &Path,
    ) -> Result<Vec<ImageRecord>> {
        let centroids = store::read_centroids(centroids, self.config.dims())?;
        let (mut records, _) = self.scan(images, Some(router))?;
        if records.is_empty() {
            warn!("目录中没有找到图片: {}", images.display());
            return Ok(records);
        }

        for record in records.iter_mut() {
            record.cluster = Some(self.clusterer.nearest(&centroids, &record.vector)?);
        }
        info!("已预测 {} 张图片", records.len());

        router.route(images, output, assignments(&records))?;
        Ok(records)
    }
}

fn assignments(records: &[ImageRecord]) -> impl Iterator<Item = (&str, usize)> {
    records.iter().filter_map(|r| r.cluster.map(|c| (r.file_name.as_str(), c)))
}
