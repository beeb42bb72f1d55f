use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{ArrayRef, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use proba_adapter::codec::RequestPayload;
use proba_adapter::data::value::CellValue;
use proba_adapter::model::classifier::{LogisticRegression, MultiClass};
use proba_adapter::model::transform::{ColumnTransformer, HandleUnknown, TransformOp, Transformer};
use proba_adapter::Pipeline;

const SEGMENTS: [&str; 3] = ["retail", "smb", "enterprise"];

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
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    /// Uniform in `[lo, hi)`.
    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        let unit = (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64;
        lo + (hi - lo) * unit
    }
}

fn columns(names: &[&str]) -> Vec<String> {
    names.iter().map(|s| s.to_string()).collect()
}

/// A churn-style model: scaled numerics, one-hot segment, raw tenure.
fn sample_pipeline() -> Pipeline {
    Pipeline {
        preprocessor: ColumnTransformer {
            transformers: vec![
                Transformer {
                    name: "num".into(),
                    columns: columns(&["age", "income"]),
                    op: TransformOp::StandardScaler {
                        mean: vec![42.0, 3200.0],
                        scale: vec![12.0, 1500.0],
                    },
                },
                Transformer {
                    name: "cat".into(),
                    columns: columns(&["segment"]),
                    op: TransformOp::OneHotEncoder {
                        categories: vec![columns(&SEGMENTS)],
                        handle_unknown: HandleUnknown::Ignore,
                    },
                },
                Transformer {
                    name: "raw".into(),
                    columns: columns(&["tenure"]),
                    op: TransformOp::Passthrough,
                },
                Transformer {
                    name: "remainder".into(),
                    columns: columns(&["customer_id"]),
                    op: TransformOp::Drop,
                },
            ],
        },
        classifier: LogisticRegression {
            classes: columns(&["stay", "churn"]),
            coef: vec![vec![-0.4, -0.9, 0.6, 0.1, -0.7, -0.25]],
            intercept: vec![0.3],
            multi_class: MultiClass::default(),
        },
    }
}

struct Records {
    id: Vec<i64>,
    age: Vec<i64>,
    income: Vec<f64>,
    segment: Vec<String>,
    tenure: Vec<f64>,
}

fn generate_records(n: usize, rng: &mut SimpleRng) -> Records {
    let mut records = Records {
        id: Vec::with_capacity(n),
        age: Vec::with_capacity(n),
        income: Vec::with_capacity(n),
        segment: Vec::with_capacity(n),
        tenure: Vec::with_capacity(n),
    };
    for i in 0..n {
        records.id.push(1000 + i as i64);
        records.age.push(rng.uniform(18.0, 75.0) as i64);
        records.income.push((rng.uniform(800.0, 9000.0) * 100.0).round() / 100.0);
        records
            .segment
            .push(SEGMENTS[(rng.next_u64() % SEGMENTS.len() as u64) as usize].to_string());
        records.tenure.push((rng.uniform(0.0, 12.0) * 10.0).round() / 10.0);
    }
    records
}

fn write_request(records: &Records, path: &Path) -> Result<()> {
    let payload = RequestPayload {
        headers: columns(&["customer_id", "age", "income", "segment", "tenure"]),
        input: (0..records.id.len())
            .map(|i| {
                vec![
                    CellValue::Integer(records.id[i]),
                    CellValue::Integer(records.age[i]),
                    CellValue::Float(records.income[i]),
                    CellValue::String(records.segment[i].clone()),
                    CellValue::Float(records.tenure[i]),
                ]
            })
            .collect(),
    };
    let text = serde_json::to_string_pretty(&payload)?;
    std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))
}

fn write_parquet(records: &Records, path: &Path) -> Result<()> {
    let schema = Arc::new(Schema::new(vec![
        Field::new("customer_id", DataType::Int64, false),
        Field::new("age", DataType::Int64, false),
        Field::new("income", DataType::Float64, false),
        Field::new("segment", DataType::Utf8, false),
        Field::new("tenure", DataType::Float64, false),
    ]));

    let columns: Vec<ArrayRef> = vec![
        Arc::new(Int64Array::from(records.id.clone())),
        Arc::new(Int64Array::from(records.age.clone())),
        Arc::new(Float64Array::from(records.income.clone())),
        Arc::new(StringArray::from(records.segment.clone())),
        Arc::new(Float64Array::from(records.tenure.clone())),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns).context("building record batch")?;

    let file = std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing parquet batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();
    let mut rng = SimpleRng::new(42);

    let model_dir = Path::new("sample_model");
    std::fs::create_dir_all(model_dir).context("creating sample_model/")?;
    let model_path = model_dir.join(proba_adapter::config::DEFAULT_ARTIFACT);
    std::fs::write(&model_path, serde_json::to_string_pretty(&sample_pipeline())?)
        .with_context(|| format!("writing {}", model_path.display()))?;

    let records = generate_records(200, &mut rng);
    write_request(&records, Path::new("sample_request.json"))?;
    write_parquet(&records, Path::new("sample_batch.parquet"))?;

    println!(
        "Wrote {} and {} records to sample_request.json / sample_batch.parquet",
        model_path.display(),
        records.id.len()
    );
    Ok(())
}
