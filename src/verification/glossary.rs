/*!
 * Terminology glossary used by the semantic check.
 *
 * A glossary is an ordered list of `(source term, target term)` pairs. The
 * built-in table covers common English mathematics vocabulary with its
 * standard Korean rendering.
 */

use serde::{Deserialize, Serialize};

/// Built-in English to Korean mathematics terminology
const MATHEMATICS_KO: &[(&str, &str)] = &[
    ("group", "군"),
    ("ring", "환"),
    ("field", "체"),
    ("vector space", "벡터 공간"),
    ("manifold", "다양체"),
    ("topology", "위상수학"),
    ("topological", "위상적"),
    ("homeomorphism", "위상동형사상"),
    ("isomorphism", "동형사상"),
    ("homomorphism", "준동형사상"),
    ("automorphism", "자기동형사상"),
    ("endomorphism", "자기준동형사상"),
    ("Abelian", "아벨"),
    ("abelian", "아벨"),
    ("commutative", "가환"),
    ("associative", "결합"),
    ("distributive", "분배"),
    ("identity element", "항등원"),
    ("inverse", "역원"),
    ("subgroup", "부분군"),
    ("normal subgroup", "정규 부분군"),
    ("quotient group", "몫군"),
    ("kernel", "핵"),
    ("image", "상"),
    ("surjective", "전사"),
    ("injective", "단사"),
    ("bijective", "전단사"),
    ("polynomial", "다항식"),
    ("eigenvalue", "고유값"),
    ("eigenvector", "고유벡터"),
    ("determinant", "행렬식"),
    ("matrix", "행렬"),
    ("trace", "대각합"),
    ("linear", "선형"),
    ("nonlinear", "비선형"),
    ("continuous", "연속"),
    ("differentiable", "미분가능"),
    ("integrable", "적분가능"),
    ("holomorphic", "정칙"),
    ("meromorphic", "유리형"),
    ("analytic", "해석적"),
    ("compact", "컴팩트"),
    ("open set", "열린집합"),
    ("closed set", "닫힌집합"),
    ("bounded", "유계"),
    ("convergent", "수렴"),
    ("divergent", "발산"),
    ("sequence", "수열"),
    ("series", "급수"),
    ("limit", "극한"),
    ("derivative", "도함수"),
    ("integral", "적분"),
    ("measure", "측도"),
    ("probability", "확률"),
    ("random variable", "확률변수"),
    ("theorem", "정리"),
    ("lemma", "보조정리"),
    ("corollary", "따름정리"),
    ("conjecture", "추측"),
    ("proof", "증명"),
    ("axiom", "공리"),
    ("definition", "정의"),
    ("proposition", "명제"),
    ("prime", "소수"),
    ("irrational", "무리수"),
    ("rational", "유리수"),
    ("integer", "정수"),
    ("real number", "실수"),
    ("complex number", "복소수"),
    ("natural number", "자연수"),
    ("finite", "유한"),
    ("infinite", "무한"),
    ("countable", "가산"),
    ("uncountable", "비가산"),
    ("dimension", "차원"),
    ("degree", "차수"),
    ("order", "위수"),
    ("finitely generated", "유한 생성"),
    ("equivalence", "동치"),
    ("invariant", "불변량"),
    ("symmetry", "대칭"),
    ("permutation", "순열"),
    ("combination", "조합"),
];

/// Source terms this short are too ambiguous to flag
const MIN_FLAGGED_TERM_CHARS: usize = 5;

/// One terminology pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    /// Term in the source language
    pub source: String,
    /// Expected rendering in the target language
    pub target: String,
}

impl GlossaryEntry {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// Ordered terminology pairs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Glossary {
    entries: Vec<GlossaryEntry>,
}

impl Glossary {
    pub fn from_entries(entries: Vec<GlossaryEntry>) -> Self {
        Self { entries }
    }

    /// English to Korean mathematics glossary
    pub fn builtin_mathematics() -> Self {
        Self::from_entries(
            MATHEMATICS_KO
                .iter()
                .map(|(source, target)| GlossaryEntry::new(*source, *target))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &GlossaryEntry> {
        self.entries.iter()
    }

    /// Entries whose source term occurs in `original` but whose target term is absent from `translated`
    ///
    /// The source match is case-insensitive; source terms shorter than five
    /// characters are never reported.
    pub fn missing_terms<'a>(&'a self, original: &str, translated: &str) -> Vec<&'a GlossaryEntry> {
        let original = original.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.source.chars().count() >= MIN_FLAGGED_TERM_CHARS)
            .filter(|entry| original.contains(&entry.source.to_lowercase()))
            .filter(|entry| !translated.contains(entry.target.as_str()))
            .collect()
    }
}
