use kmeans::{EuclideanDistance, KMeans, KMeansConfig, KMeansState};
use log::info;

use crate::error::{Error, Result};
use crate::feature::FeatureVector;

/// 聚类结果，`assignments[i]` 是第 i 个输入向量所属的聚类编号
#[derive(Debug, Clone)]
pub struct Clustering {
    pub centroids: Vec<FeatureVector>,
    pub assignments: Vec<usize>,
}

/// 聚类算法
pub trait Clusterer {
    /// 将 `points` 分成 `k` 类
    fn cluster(&self, points: &[FeatureVector], k: usize) -> Result<Clustering>;

    /// 返回距离 `point` 最近的聚类中心编号，距离相同时取编号较小的
    fn nearest(&self, centroids: &[FeatureVector], point: &FeatureVector) -> Result<usize> {
        nearest(centroids, point)
    }
}

fn squared_distance(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

/// 使用欧氏距离查找最近的聚类中心
pub fn nearest(centroids: &[FeatureVector], point: &FeatureVector) -> Result<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, c) in centroids.iter().enumerate() {
        if c.len() != point.len() {
            return Err(Error::DimensionMismatch { expected: c.len(), actual: point.len() });
        }
        let d = squared_distance(c, point);
        if best.is_none_or(|(_, min)| d < min) {
            best = Some((i, d));
        }
    }
    best.map(|(i, _)| i).ok_or_else(|| Error::Clustering("模型中没有聚类中心".to_string()))
}

fn imbalance_factor(hist: &[usize]) -> f32 {
    let (mut tot, mut uf) = (0.0, 0.0);
    for h in hist {
        let h = *h as f32;
        tot += h;
        uf += h.powf(2.0);
    }
    uf * hist.len() as f32 / tot.powf(2.0)
}

/// Lloyd 迭代 k-means
#[derive(Debug, Clone, Copy)]
pub struct LloydKMeans {
    pub max_iter: usize,
    /// 是否打印每轮迭代的信息
    pub verbose: bool,
}

impl Default for LloydKMeans {
    fn default() -> Self {
        Self { max_iter: 100, verbose: true }
    }
}

impl Clusterer for LloydKMeans {
    fn cluster(&self, points: &[FeatureVector], k: usize) -> Result<Clustering> {
        let n = points.len();
        let d = points.first().map_or(0, |p| p.len());
        if d == 0 {
            return Err(Error::Clustering("向量长度为 0".to_string()));
        }
        let mut samples = Vec::with_capacity(n * d);
        for p in points {
            if p.len() != d {
                return Err(Error::DimensionMismatch { expected: d, actual: p.len() });
            }
            samples.extend_from_slice(p);
        }

        let km: KMeans<f32, 8, _> = KMeans::new(&samples, n, d, EuclideanDistance);
        let conf = if self.verbose {
            KMeansConfig::build()
                .init_done(&|_s: &KMeansState<f32>| info!("KMeans 初始化完成"))
                .iteration_done(&|s: &KMeansState<f32>, nr: usize, new_distsum: f32| {
                    info!(
                        "第 {} 轮 - 不平衡度：{:.2} | 距离和变化：{:+.4}",
                        nr,
                        imbalance_factor(&s.centroid_frequency),
                        new_distsum - s.distsum
                    );
                })
                .build()
        } else {
            KMeansConfig::default()
        };
        // NOTE: init_kmeanplusplus 会 panic，这里随机选取样本作为初始中心
        let result = km.kmeans_lloyd(k, self.max_iter, KMeans::init_random_sample, &conf);

        let centroids = result.centroids.to_vec();
        if centroids.len() != k * d {
            return Err(Error::Clustering(format!(
                "聚类中心长度为 {}，期望 {}",
                centroids.len(),
                k * d
            )));
        }
        Ok(Clustering {
            centroids: centroids.chunks(d).map(|c| FeatureVector::new(c.to_vec())).collect(),
            assignments: result.assignments.to_vec(),
        })
    }
}

/// 检查输入后调用聚类算法，并检查结果的形状
pub fn train<C: Clusterer + ?Sized>(
    clusterer: &C,
    points: &[FeatureVector],
    k: usize,
) -> Result<Clustering> {
    let n = points.len();
    if k == 0 || k > n {
        return Err(Error::InvalidClusterCount { k, n });
    }
    let d = points[0].len();

    info!("对 {n} 个 {d} 维向量进行聚类，中心点数量 = {k}");
    let clustering = clusterer.cluster(points, k)?;

    if clustering.centroids.len() != k {
        return Err(Error::Clustering(format!(
            "得到 {} 个聚类中心，期望 {}",
            clustering.centroids.len(),
            k
        )));
    }
    if let Some(c) = clustering.centroids.iter().find(|c| c.len() != d) {
        return Err(Error::DimensionMismatch { expected: d, actual: c.len() });
    }
    if clustering.assignments.len() != n || clustering.assignments.iter().any(|&a| a >= k) {
        return Err(Error::Clustering("聚类结果与输入不对应".to_string()));
    }

    let mut hist = vec![0; k];
    clustering.assignments.iter().for_each(|&a| hist[a] += 1);
    info!("聚类完成，各类数量：{:?}", hist);

    Ok(clustering)
}
