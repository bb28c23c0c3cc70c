use std::path::PathBuf;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use bpa_predict::model::codec::save_model;
use bpa_predict::model::{DecisionTree, Node, RandomForest};
use parquet::arrow::ArrowWriter;

const N_FEATURES: usize = 6;
const N_TREES: usize = 25;
const TREE_DEPTH: u32 = 3;
const N_ROWS: usize = 20;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next_u64() % n as u64) as usize
    }
}

/// Complete binary tree in heap layout: node `i` has children `2i+1`, `2i+2`.
fn random_tree(rng: &mut SimpleRng) -> DecisionTree {
    let internal = (1usize << TREE_DEPTH) - 1;
    let total = (1usize << (TREE_DEPTH + 1)) - 1;
    let nodes = (0..total)
        .map(|i| {
            if i < internal {
                Node::Split {
                    feature: rng.below(N_FEATURES),
                    threshold: rng.next_f64(),
                    left: 2 * i + 1,
                    right: 2 * i + 2,
                }
            } else {
                let bpa = rng.below(20) as f64;
                let upa = rng.below(20) as f64;
                Node::Leaf {
                    weights: vec![bpa, upa + 1.0],
                }
            }
        })
        .collect();
    DecisionTree { nodes }
}

fn main() {
    let out_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| "sample".into()));
    let mut rng = SimpleRng::new(42);

    let feature_names: Vec<String> = (0..N_FEATURES).map(|i| format!("feature_{i}")).collect();
    let forest = RandomForest {
        n_features: N_FEATURES,
        feature_names: feature_names.clone(),
        classes: vec![0, 1],
        trees: (0..N_TREES).map(|_| random_tree(&mut rng)).collect(),
    };
    forest.validate().expect("generated forest is invalid");

    let model_path = out_dir.join("model").join("RF_binary_v1.pickle");
    save_model(&model_path, &forest).expect("Failed to write model");

    // Column-major feature values; row 3 has one missing value.
    let columns: Vec<Vec<Option<f64>>> = (0..N_FEATURES)
        .map(|c| {
            (0..N_ROWS)
                .map(|r| {
                    let v = (rng.next_f64() * 1000.0).round() / 1000.0;
                    if r == 3 && c == 1 { None } else { Some(v) }
                })
                .collect()
        })
        .collect();

    // CSV
    let csv_path = out_dir.join("sample_features.csv");
    let mut writer = csv::Writer::from_path(&csv_path).expect("Failed to create CSV");
    writer.write_record(&feature_names).expect("Failed to write header");
    for r in 0..N_ROWS {
        let record: Vec<String> = columns
            .iter()
            .map(|col| col[r].map(|v| v.to_string()).unwrap_or_default())
            .collect();
        writer.write_record(&record).expect("Failed to write row");
    }
    writer.flush().expect("Failed to flush CSV");

    // Parquet
    let schema = Arc::new(Schema::new(
        feature_names
            .iter()
            .map(|name| Field::new(name.as_str(), DataType::Float64, true))
            .collect::<Vec<_>>(),
    ));
    let arrays: Vec<ArrayRef> = columns
        .iter()
        .map(|col| Arc::new(Float64Array::from(col.clone())) as ArrayRef)
        .collect();
    let batch = RecordBatch::try_new(schema.clone(), arrays).expect("Failed to create RecordBatch");

    let parquet_path = out_dir.join("sample_features.parquet");
    let file = std::fs::File::create(&parquet_path).expect("Failed to create output file");
    let mut writer = ArrowWriter::try_new(file, schema, None).expect("Failed to create writer");
    writer.write(&batch).expect("Failed to write batch");
    writer.close().expect("Failed to close writer");

    println!(
        "Wrote {N_TREES}-tree model to {}, {N_ROWS} rows to {} and {}",
        model_path.display(),
        csv_path.display(),
        parquet_path.display()
    );
}
