//! Semantic matching of role labels against employee skill profiles

use crate::config::{Config, EmbeddingBackendKind};
use crate::error::{Result, TeamOptimizerError};
use crate::processing::model::Employee;
use log::{debug, info};
use model2vec_rs::model::StaticModel;
use ndarray::Array2;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

/// A text encoder producing one dense vector per input, order preserved.
///
/// Implementations are loaded once per process and shared read-only.
pub trait EmbeddingBackend: Send + Sync {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn model_name(&self) -> &str;
}

/// Model2Vec static embeddings.
pub struct Model2VecBackend {
    model: StaticModel,
    model_name: String,
}

impl Model2VecBackend {
    pub fn load(model_path: &Path, model_name: &str) -> Result<Self> {
        let start_time = Instant::now();
        info!("Loading Model2Vec embedding model from: {}", model_path.display());

        if !model_path.exists() {
            return Err(TeamOptimizerError::EmbeddingUnavailable(format!(
                "Model '{}' not found at {} (run `team-optimizer models download {}`)",
                model_name,
                model_path.display(),
                model_name
            )));
        }

        let model = StaticModel::from_pretrained(model_path, None, None, None).map_err(|e| {
            TeamOptimizerError::EmbeddingUnavailable(format!("Failed to load model: {}", e))
        })?;

        info!("Model loaded successfully in {:.2?}", start_time.elapsed());

        Ok(Self {
            model,
            model_name: model_name.to_string(),
        })
    }
}

impl EmbeddingBackend for Model2VecBackend {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(self.model.encode(texts))
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}

/// Deterministic feature-hashing embedder.
///
/// Words and character trigrams are hashed into a fixed number of buckets.
/// No model files are needed, which makes it usable offline.
pub struct HashingBackend {
    dimensions: usize,
}

impl Default for HashingBackend {
    fn default() -> Self {
        Self::new(256)
    }
}

impl HashingBackend {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn fnv1a(bytes: &[u8]) -> u64 {
        let mut hash: u64 = 0xcbf29ce484222325;
        for byte in bytes {
            hash ^= u64::from(*byte);
            hash = hash.wrapping_mul(0x100000001b3);
        }
        hash
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();

        for word in lowered.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let bucket = (Self::fnv1a(word.as_bytes()) % self.dimensions as u64) as usize;
            vector[bucket] += 1.0;

            let padded: Vec<char> = format!(" {} ", word).chars().collect();
            for trigram in padded.windows(3) {
                let gram: String = trigram.iter().collect();
                let bucket = (Self::fnv1a(gram.as_bytes()) % self.dimensions as u64) as usize;
                vector[bucket] += 0.5;
            }
        }

        vector
    }
}

impl EmbeddingBackend for HashingBackend {
    fn encode(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed(t)).collect())
    }

    fn model_name(&self) -> &str {
        "feature-hashing"
    }
}

/// Build the process-wide backend selected by the configuration.
pub fn backend_from_config(config: &Config) -> Result<Arc<dyn EmbeddingBackend>> {
    match config.models.backend {
        EmbeddingBackendKind::Model2vec => {
            let model_path = config.models_dir().join(&config.models.embedding_model);
            let backend = Model2VecBackend::load(&model_path, &config.models.embedding_model)?;
            Ok(Arc::new(backend))
        }
        EmbeddingBackendKind::Hashing => Ok(Arc::new(HashingBackend::default())),
    }
}

/// Cosine similarity. Zero vectors compare as 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(TeamOptimizerError::Processing(format!(
            "Embedding dimensions don't match: {} vs {}",
            a.len(),
            b.len()
        )));
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        Ok(0.0)
    } else {
        Ok((dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0))
    }
}

/// Role x employee cosine similarities. Row i is role i, column j is employee j.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    values: Array2<f32>,
}

impl SimilarityMatrix {
    pub fn from_array(values: Array2<f32>) -> Self {
        Self { values }
    }

    pub fn get(&self, role: usize, employee: usize) -> f32 {
        self.values[[role, employee]]
    }

    pub fn roles(&self) -> usize {
        self.values.nrows()
    }

    pub fn employees(&self) -> usize {
        self.values.ncols()
    }

    pub fn as_array(&self) -> &Array2<f32> {
        &self.values
    }
}

#[derive(Clone)]
pub struct SemanticMatcher {
    backend: Arc<dyn EmbeddingBackend>,
    generic_vocabulary: Vec<String>,
}

impl SemanticMatcher {
    pub fn new(backend: Arc<dyn EmbeddingBackend>, generic_vocabulary: Vec<String>) -> Self {
        Self {
            backend,
            generic_vocabulary,
        }
    }

    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    /// Embed roles and employee profiles and compare every pair.
    ///
    /// Any backend failure, or output that does not line up with the inputs,
    /// is reported as [`TeamOptimizerError::EmbeddingUnavailable`].
    pub fn similarity_matrix(&self, roles: &[String], employees: &[Employee]) -> Result<SimilarityMatrix> {
        let start_time = Instant::now();

        let profiles: Vec<String> = employees
            .iter()
            .map(|e| e.skill_profile(&self.generic_vocabulary))
            .collect();

        let role_embeddings = self.encode_checked(roles)?;
        let employee_embeddings = self.encode_checked(&profiles)?;

        let mut values = Array2::<f32>::zeros((roles.len(), employees.len()));
        for (i, role_vec) in role_embeddings.iter().enumerate() {
            for (j, employee_vec) in employee_embeddings.iter().enumerate() {
                values[[i, j]] = cosine_similarity(role_vec, employee_vec)
                    .map_err(|e| TeamOptimizerError::EmbeddingUnavailable(e.to_string()))?;
            }
        }

        debug!(
            "Similarity matrix {}x{} computed in {:.2?} with {}",
            roles.len(),
            employees.len(),
            start_time.elapsed(),
            self.backend.model_name()
        );

        Ok(SimilarityMatrix { values })
    }

    fn encode_checked(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let embeddings = self.backend.encode(texts).map_err(|e| match e {
            TeamOptimizerError::EmbeddingUnavailable(_) => e,
            other => TeamOptimizerError::EmbeddingUnavailable(other.to_string()),
        })?;

        if embeddings.len() != texts.len() {
            return Err(TeamOptimizerError::EmbeddingUnavailable(format!(
                "Backend returned {} embeddings for {} inputs",
                embeddings.len(),
                texts.len()
            )));
        }

        if embeddings.iter().any(|v| v.is_empty() || v.iter().any(|x| !x.is_finite())) {
            return Err(TeamOptimizerError::EmbeddingUnavailable(
                "Backend returned empty or non-finite embeddings".to_string(),
            ));
        }

        Ok(embeddings)
    }
}
