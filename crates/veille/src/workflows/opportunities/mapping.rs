use std::collections::HashMap;
use std::sync::OnceLock;

/// Canonical candidate attribute a generator key resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum CandidateField {
    Id,
    Title,
    Description,
    Sector,
    Channel,
    Scores,
    Relevance,
    Novelty,
    Difficulty,
    FinancialPotential,
    CompetitionLevel,
    Composite,
    RecommendedActions,
    ReferenceLink,
    Tags,
    UncontestedMarket,
}

/// Key a generator used for a field, ranked by how canonical it is.
///
/// Rank 0 is the canonical name; higher ranks are looser aliases that never
/// replace a usable value read from a lower rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ResolvedKey {
    pub(crate) field: CandidateField,
    pub(crate) rank: usize,
}

static FIELD_ALIASES: OnceLock<HashMap<String, ResolvedKey>> = OnceLock::new();
static BATCH_KEYS: OnceLock<HashMap<String, usize>> = OnceLock::new();

/// Folds camelCase, snake_case and spaced keys onto one lookup form.
pub(crate) fn normalize_key(value: &str) -> String {
    value
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

pub(crate) fn resolve_key(key: &str) -> Option<ResolvedKey> {
    field_aliases().get(&normalize_key(key)).copied()
}

/// Rank of a candidate-list key; `opportunities` is 0.
pub(crate) fn batch_key_rank(key: &str) -> Option<usize> {
    batch_keys().get(&normalize_key(key)).copied()
}

fn batch_keys() -> &'static HashMap<String, usize> {
    BATCH_KEYS.get_or_init(|| {
        [
            "opportunities",
            "opportunites",
            "opportunités",
            "candidates",
            "items",
            "results",
        ]
        .into_iter()
        .enumerate()
        .map(|(rank, key)| (normalize_key(key), rank))
        .collect()
    })
}

fn field_aliases() -> &'static HashMap<String, ResolvedKey> {
    FIELD_ALIASES.get_or_init(|| {
        use CandidateField::*;

        // Entries of one field are listed from most to least canonical.
        const KEY_TO_FIELD: &[(&str, CandidateField)] = &[
            ("id", Id),
            ("identifier", Id),
            ("identifiant", Id),
            ("uuid", Id),
            ("title", Title),
            ("titre", Title),
            ("name", Title),
            ("nom", Title),
            ("intitulé", Title),
            ("intitule", Title),
            ("description", Description),
            ("summary", Description),
            ("résumé", Description),
            ("resume", Description),
            ("sector", Sector),
            ("secteur", Sector),
            ("industry", Sector),
            ("industrie", Sector),
            ("domaine", Sector),
            ("channel", Channel),
            ("canal", Channel),
            ("distribution_channel", Channel),
            ("canal_de_distribution", Channel),
            ("scores", Scores),
            ("sub_scores", Scores),
            ("notes", Scores),
            // Sub-scores
            ("relevance", Relevance),
            ("relevance_score", Relevance),
            ("pertinence", Relevance),
            ("score_pertinence", Relevance),
            ("novelty", Novelty),
            ("novelty_score", Novelty),
            ("nouveauté", Novelty),
            ("nouveaute", Novelty),
            ("innovation", Novelty),
            ("difficulty", Difficulty),
            ("difficulty_score", Difficulty),
            ("difficulté", Difficulty),
            ("difficulte", Difficulty),
            ("financialPotential", FinancialPotential),
            ("financial_potential_score", FinancialPotential),
            ("revenue_potential", FinancialPotential),
            ("potential", FinancialPotential),
            ("potentiel", FinancialPotential),
            ("potentielFinancier", FinancialPotential),
            ("competitionLevel", CompetitionLevel),
            ("competition", CompetitionLevel),
            ("concurrence", CompetitionLevel),
            ("niveau_concurrence", CompetitionLevel),
            ("niveau_de_concurrence", CompetitionLevel),
            ("scoreGlobal", Composite),
            ("global_score", Composite),
            ("overall_score", Composite),
            ("composite", Composite),
            ("score", Composite),
            // Follow-up material
            ("recommendedActions", RecommendedActions),
            ("actions", RecommendedActions),
            ("next_steps", RecommendedActions),
            ("actionsRecommandées", RecommendedActions),
            ("actionsRecommandees", RecommendedActions),
            ("referenceLink", ReferenceLink),
            ("link", ReferenceLink),
            ("url", ReferenceLink),
            ("lien", ReferenceLink),
            ("source", ReferenceLink),
            ("tags", Tags),
            ("labels", Tags),
            ("keywords", Tags),
            ("mots_clés", Tags),
            ("mots_cles", Tags),
            ("isUncontestedMarket", UncontestedMarket),
            ("uncontested_market", UncontestedMarket),
            ("blue_ocean", UncontestedMarket),
            ("is_blue_ocean", UncontestedMarket),
            ("océan_bleu", UncontestedMarket),
            ("ocean_bleu", UncontestedMarket),
            ("est_ocean_bleu", UncontestedMarket),
        ];

        let mut next_rank: HashMap<CandidateField, usize> = HashMap::new();
        let mut map = HashMap::with_capacity(KEY_TO_FIELD.len());
        for (key, field) in KEY_TO_FIELD {
            let rank = next_rank.entry(*field).or_insert(0);
            map.entry(normalize_key(key)).or_insert(ResolvedKey {
                field: *field,
                rank: *rank,
            });
            *rank += 1;
        }
        map
    })
}
