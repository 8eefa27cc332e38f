//! Reproducible synthetic datasets and canonical causal graphs.
//!
//! Every generator takes an explicit seed and draws from `ChaCha8Rng`, so
//! the same `(n, seed)` always yields the same dataset on every platform.

use rand::distributions::Distribution;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use statrs::distribution::Normal;
use uplift_core::types::{Column, ColumnKind, Dataset, Schema};

/// Funnel graph with the four marketing confounders.
pub fn marketing_edges() -> &'static [&'static str] {
    &[
        "Seasonality -> CampaignSpend",
        "AdQuality -> CampaignSpend",
        "ChannelType -> CampaignSpend",
        "CustomerSegment -> CampaignSpend",
        "Seasonality -> Conversions",
        "AdQuality -> Conversions",
        "ChannelType -> Conversions",
        "CustomerSegment -> Conversions",
        "CampaignSpend -> Impressions",
        "Impressions -> Clicks",
        "Clicks -> Conversions",
    ]
}

/// Funnel graph with seasonality as the only confounder.
pub fn funnel_edges() -> &'static [&'static str] {
    &[
        "Seasonality -> CampaignSpend",
        "Seasonality -> Conversions",
        "CampaignSpend -> Impressions",
        "Impressions -> Clicks",
        "Clicks -> Conversions",
    ]
}

/// Edges for [`confounded_dataset`].
pub fn confounded_edges() -> &'static [&'static str] {
    &["Season -> Spend", "Season -> Sales", "Spend -> Sales"]
}

/// Total effect of spend on conversions in [`campaign_dataset`], averaged
/// over segments: 0.05 through the funnel plus 0.035 direct.
pub const CAMPAIGN_ATE: f64 = 0.085;

/// Per-segment spend effect in [`campaign_dataset`].
pub const SEGMENT_ATE: [(&str, f64); 2] = [("A", 0.10), ("B", 0.07)];

pub fn campaign_schema() -> Schema {
    Schema::builder()
        .treatment("CampaignSpend")
        .outcome("Conversions")
        .numeric_confounder("Seasonality")
        .categorical_confounder("AdQuality")
        .categorical_confounder("ChannelType")
        .group("CustomerSegment")
        .other("Impressions", ColumnKind::Numeric)
        .other("Clicks", ColumnKind::Numeric)
        .build()
        .expect("campaign schema is valid")
}

/// Marketing funnel data with confounded spend.
///
/// Spend is uniform on [100, 1000), raised by 200 in season, by 15% for
/// high-quality ads and cut by 10% on social. Conversions follow clicks and
/// the confounders; segment A responds to spend more strongly than B.
pub fn campaign_dataset(n: usize, seed: u64) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let impression_noise = normal(100.0);
    let click_noise = normal(5.0);
    let conversion_noise = normal(2.0);

    let mut spend = Vec::with_capacity(n);
    let mut seasonality = Vec::with_capacity(n);
    let mut quality = Vec::with_capacity(n);
    let mut channel = Vec::with_capacity(n);
    let mut segment = Vec::with_capacity(n);
    let mut impressions = Vec::with_capacity(n);
    let mut clicks = Vec::with_capacity(n);
    let mut conversions = Vec::with_capacity(n);

    for _ in 0..n {
        let season = f64::from(rng.gen_range(0..2u8));
        let high = rng.gen_bool(0.5);
        let ch = ["Search", "Social", "Display"][rng.gen_range(0..3)];
        let seg = if rng.gen_bool(0.5) { "A" } else { "B" };

        let mut s = rng.gen_range(100.0..1000.0) + 200.0 * season;
        if high {
            s *= 1.15;
        }
        if ch == "Social" {
            s *= 0.9;
        }

        let imp = s * 10.0 + impression_noise.sample(&mut rng);
        let clk = imp * 0.05 + click_noise.sample(&mut rng);
        let segment_effect = if seg == "A" { 0.05 } else { 0.02 };
        let conv = clk * 0.1
            + conversion_noise.sample(&mut rng)
            + 5.0 * season
            + segment_effect * s
            + if high { 3.0 } else { 0.0 }
            - if ch == "Display" { 2.0 } else { 0.0 };

        spend.push(s);
        seasonality.push(season);
        quality.push(if high { "High" } else { "Low" }.to_string());
        channel.push(ch.to_string());
        segment.push(seg.to_string());
        impressions.push(imp);
        clicks.push(clk);
        conversions.push(conv);
    }

    Dataset::new(
        campaign_schema(),
        vec![
            ("CampaignSpend".into(), Column::Numeric(spend)),
            ("Conversions".into(), Column::Numeric(conversions)),
            ("Seasonality".into(), Column::Numeric(seasonality)),
            ("AdQuality".into(), Column::Categorical(quality)),
            ("ChannelType".into(), Column::Categorical(channel)),
            ("CustomerSegment".into(), Column::Categorical(segment)),
            ("Impressions".into(), Column::Numeric(impressions)),
            ("Clicks".into(), Column::Numeric(clicks)),
        ],
    )
    .expect("campaign columns match schema")
}

/// Spend with effect 0.1 on sales and a binary season that adds 200 to
/// spend and 5 to sales.
pub fn confounded_dataset(n: usize, seed: u64) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let noise = normal(2.0);
    let mut spend = Vec::with_capacity(n);
    let mut season = Vec::with_capacity(n);
    let mut sales = Vec::with_capacity(n);
    for _ in 0..n {
        let z = f64::from(rng.gen_range(0..2u8));
        let t = rng.gen_range(100.0..1000.0) + 200.0 * z;
        spend.push(t);
        season.push(z);
        sales.push(0.1 * t + 5.0 * z + noise.sample(&mut rng));
    }

    let schema = Schema::builder()
        .treatment("Spend")
        .outcome("Sales")
        .numeric_confounder("Season")
        .build()
        .expect("confounded schema is valid");
    Dataset::new(
        schema,
        vec![
            ("Spend".into(), Column::Numeric(spend)),
            ("Sales".into(), Column::Numeric(sales)),
            ("Season".into(), Column::Numeric(season)),
        ],
    )
    .expect("confounded columns match schema")
}

/// Unconfounded `y = 1 + beta * t + N(0, 1)` with `t` uniform on [0, 10).
/// Also carries an unrelated numeric column `Noise`.
pub fn linear_dataset(n: usize, beta: f64, seed: u64) -> Dataset {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let noise = normal(1.0);
    let t: Vec<f64> = (0..n).map(|_| rng.gen_range(0.0..10.0)).collect();
    let y: Vec<f64> = t.iter().map(|ti| 1.0 + beta * ti + noise.sample(&mut rng)).collect();
    let unrelated: Vec<f64> = (0..n).map(|_| noise.sample(&mut rng)).collect();

    let schema = Schema::builder()
        .treatment("Treatment")
        .outcome("Outcome")
        .numeric_confounder("Noise")
        .build()
        .expect("linear schema is valid");
    Dataset::new(
        schema,
        vec![
            ("Treatment".into(), Column::Numeric(t)),
            ("Outcome".into(), Column::Numeric(y)),
            ("Noise".into(), Column::Numeric(unrelated)),
        ],
    )
    .expect("linear columns match schema")
}

fn normal(std_dev: f64) -> Normal {
    Normal::new(0.0, std_dev).expect("positive standard deviation")
}
