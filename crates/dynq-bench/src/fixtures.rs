//! Test data generation for benchmarks.
//!
//! Generators are seeded so every run filters the same records.

use std::borrow::Cow;

use dynq_core::record::reader;
use dynq_core::{EntityDef, FieldDef, FieldType, RecordSchema, Row, ScalarType};
use dynq_proto::Value;
use rand::distributions::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Scale factor for benchmark data generation.
#[derive(Clone, Copy, Debug, Default)]
pub enum Scale {
    /// 100 records, for quick iteration.
    Small,
    /// 10,000 records.
    #[default]
    Medium,
    /// 100,000 records.
    Large,
}

impl Scale {
    /// Get the record count for this scale.
    pub fn count(&self) -> usize {
        match self {
            Scale::Small => 100,
            Scale::Medium => 10_000,
            Scale::Large => 100_000,
        }
    }
}

/// User record for benchmarks.
#[derive(Debug, Clone)]
pub struct UserData {
    pub id: [u8; 16],
    pub name: String,
    pub email: String,
    pub nickname: Option<String>,
    pub age: i32,
    pub status: String,
    pub tags: Vec<String>,
}

/// Generate a deterministic UUID from seed and index.
fn generate_uuid(seed: u64, index: usize) -> [u8; 16] {
    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(index as u64));
    let mut id = [0u8; 16];
    rng.fill(&mut id);
    id
}

/// Generate a random string of specified length.
fn random_string(rng: &mut StdRng, len: usize) -> String {
    (0..len).map(|_| rng.sample(Alphanumeric) as char).collect()
}

/// Generate users with a realistic field distribution.
pub fn generate_users(count: usize) -> Vec<UserData> {
    const SEED: u64 = 12345;
    let mut rng = StdRng::seed_from_u64(SEED);

    let statuses = ["active", "inactive", "pending", "admin"];
    let name_prefixes = [
        "Alice", "Bob", "Charlie", "David", "Eve", "Frank", "Grace", "Henry", "Ivy", "Jack",
    ];
    let tag_pool = ["ops", "dev", "sales", "support", "billing"];

    (0..count)
        .map(|i| {
            let name_prefix = name_prefixes[i % name_prefixes.len()];
            let tag_count = rng.gen_range(0..=3);
            UserData {
                id: generate_uuid(SEED, i),
                name: format!("{}_{}", name_prefix, i),
                email: format!("user{}@example{}.com", i, i % 10),
                nickname: rng.gen_bool(0.3).then(|| random_string(&mut rng, 8)),
                age: 18 + (rng.gen::<u32>() % 60) as i32,
                status: statuses[i % statuses.len()].to_string(),
                tags: (0..tag_count)
                    .map(|_| tag_pool[rng.gen_range(0..tag_pool.len())].to_string())
                    .collect(),
            }
        })
        .collect()
}

/// Entity definition matching [`UserData`].
pub fn user_entity() -> EntityDef {
    EntityDef::new("User").with_fields([
        FieldDef::scalar("id", ScalarType::Uuid),
        FieldDef::scalar("name", ScalarType::String),
        FieldDef::scalar("email", ScalarType::String),
        FieldDef::optional_scalar("nickname", ScalarType::String),
        FieldDef::scalar("age", ScalarType::Int32),
        FieldDef::scalar("status", ScalarType::String),
        FieldDef::array("tags", ScalarType::String),
    ])
}

/// Convert a user to a dynamic row in [`user_entity`] slot order.
pub fn user_to_row(user: &UserData) -> Row {
    Row::new(vec![
        Value::Uuid(user.id),
        Value::String(user.name.clone()),
        Value::String(user.email.clone()),
        Value::from(user.nickname.clone()),
        Value::Int32(user.age),
        Value::String(user.status.clone()),
        Value::StringArray(user.tags.clone()),
    ])
}

/// Schema reading [`UserData`] fields directly.
///
/// `age` uses a non-allocating reader; the string fields clone.
pub fn user_schema() -> RecordSchema<UserData> {
    RecordSchema::new("User")
        .field("id", FieldType::Scalar(ScalarType::Uuid), |u: &UserData| u.id)
        .field("name", FieldType::Scalar(ScalarType::String), |u: &UserData| u.name.clone())
        .field("email", FieldType::Scalar(ScalarType::String), |u: &UserData| u.email.clone())
        .field(
            "nickname",
            FieldType::OptionalScalar(ScalarType::String),
            |u: &UserData| u.nickname.clone(),
        )
        .field_with(
            FieldDef::scalar("age", ScalarType::Int32),
            reader(|u: &UserData| Cow::Owned(Value::Int32(u.age))),
        )
        .field("status", FieldType::Scalar(ScalarType::String), |u: &UserData| u.status.clone())
        .field("tags", FieldType::ArrayScalar(ScalarType::String), |u: &UserData| u.tags.clone())
}
