//! Training-data records and their line-oriented interchange formats.

use serde::{Deserialize, Serialize};

use crate::error::{QuarrelError, Result};
use crate::features::feature::{Feature, FeatureSet};

/// One training record: a feature vector with its observed scores.
///
/// Two line formats are supported, both bit-exact across a
/// render-parse-render cycle:
///
/// - ranking: `score qid:topic id1:val1 id2:val2 # comment`
/// - reinforcement: `topic * score1 score2 * id1:val1 # comment`
///
/// Features are sorted by id and de-duplicated keep-first before
/// rendering (the [`FeatureSet`] invariant).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearntFeature {
    /// The feature vector.
    pub features: FeatureSet,
    /// Observed scores; the ranking format uses the first.
    pub scores: Vec<f64>,
    /// Topic identifier.
    pub topic: String,
    /// Free-text comment carried through serialization.
    pub comment: String,
}

impl LearntFeature {
    /// Create a record.
    pub fn new(features: FeatureSet, scores: Vec<f64>, topic: String, comment: String) -> Self {
        LearntFeature {
            features,
            scores,
            topic,
            comment,
        }
    }

    fn render_pairs(&self) -> Vec<String> {
        self.features
            .features()
            .iter()
            .map(|f| format!("{}:{}", f.id, f.score))
            .collect()
    }

    /// Render in the ranking-SVM line format.
    pub fn to_ranking_line(&self) -> String {
        let score = self.scores.first().copied().unwrap_or(0.0);
        let mut parts = vec![format!("{score}"), format!("qid:{}", self.topic)];
        parts.extend(self.render_pairs());
        let mut line = parts.join(" ");
        if !self.comment.is_empty() {
            line.push_str(" # ");
            line.push_str(&self.comment);
        }
        line
    }

    /// Render in the reinforcement line format.
    pub fn to_reinforcement_line(&self) -> String {
        let scores: Vec<String> = self.scores.iter().map(|s| format!("{s}")).collect();
        let mut line = format!(
            "{} * {} * {}",
            self.topic,
            scores.join(" "),
            self.render_pairs().join(" ")
        );
        if !self.comment.is_empty() {
            line.push_str(" # ");
            line.push_str(&self.comment);
        }
        line
    }

    fn split_comment(line: &str) -> (&str, &str) {
        match line.split_once(" # ") {
            Some((body, comment)) => (body, comment),
            None => (line, ""),
        }
    }

    fn parse_pair(token: &str) -> Result<Feature> {
        let (id, value) = token.split_once(':').ok_or_else(|| {
            QuarrelError::serialization(format!("malformed feature pair: {token}"))
        })?;
        let id = id
            .parse::<u32>()
            .map_err(|_| QuarrelError::serialization(format!("bad feature id: {token}")))?;
        let value = value
            .parse::<f64>()
            .map_err(|_| QuarrelError::serialization(format!("bad feature value: {token}")))?;
        Ok(Feature::new(id, value))
    }

    /// Parse a ranking-SVM line.
    pub fn from_ranking_line(line: &str) -> Result<LearntFeature> {
        let (body, comment) = Self::split_comment(line);
        let mut tokens = body.split_whitespace();

        let score = tokens
            .next()
            .ok_or_else(|| QuarrelError::serialization("empty record"))?
            .parse::<f64>()
            .map_err(|_| QuarrelError::serialization("bad score"))?;

        let topic = tokens
            .next()
            .and_then(|t| t.strip_prefix("qid:"))
            .ok_or_else(|| QuarrelError::serialization("missing qid field"))?
            .to_string();

        let mut features = Vec::new();
        for token in tokens {
            features.push(Self::parse_pair(token)?);
        }

        Ok(LearntFeature::new(
            FeatureSet::from_features(features),
            vec![score],
            topic,
            comment.to_string(),
        ))
    }

    /// Parse a reinforcement line.
    pub fn from_reinforcement_line(line: &str) -> Result<LearntFeature> {
        let (body, comment) = Self::split_comment(line);

        let mut sections = body.splitn(3, " * ");
        let topic = sections
            .next()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| QuarrelError::serialization("missing topic section"))?
            .trim()
            .to_string();
        let scores_section = sections
            .next()
            .ok_or_else(|| QuarrelError::serialization("missing scores section"))?;
        let pairs_section = sections
            .next()
            .ok_or_else(|| QuarrelError::serialization("missing features section"))?;

        let mut scores = Vec::new();
        for token in scores_section.split_whitespace() {
            scores.push(
                token
                    .parse::<f64>()
                    .map_err(|_| QuarrelError::serialization(format!("bad score: {token}")))?,
            );
        }

        let mut features = Vec::new();
        for token in pairs_section.split_whitespace() {
            features.push(Self::parse_pair(token)?);
        }

        Ok(LearntFeature::new(
            FeatureSet::from_features(features),
            scores,
            topic,
            comment.to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> LearntFeature {
        LearntFeature::new(
            FeatureSet::from_features(vec![
                Feature::new(3, 0.75),
                Feature::new(1, 2.0),
                Feature::new(7, -1.5),
            ]),
            vec![1.0, 0.25],
            "CD008122".to_string(),
            "round 2".to_string(),
        )
    }

    #[test]
    fn test_ranking_line_rendering() {
        let line = record().to_ranking_line();
        assert_eq!(line, "1 qid:CD008122 1:2 3:0.75 7:-1.5 # round 2");
    }

    #[test]
    fn test_ranking_round_trip_is_bit_exact() {
        let line = record().to_ranking_line();
        let parsed = LearntFeature::from_ranking_line(&line).unwrap();
        assert_eq!(parsed.to_ranking_line(), line);
        assert_eq!(parsed.topic, "CD008122");
        assert_eq!(parsed.scores, vec![1.0]);
        assert_eq!(parsed.comment, "round 2");
    }

    #[test]
    fn test_reinforcement_line_rendering() {
        let line = record().to_reinforcement_line();
        assert_eq!(line, "CD008122 * 1 0.25 * 1:2 3:0.75 7:-1.5 # round 2");
    }

    #[test]
    fn test_reinforcement_round_trip_is_bit_exact() {
        let line = record().to_reinforcement_line();
        let parsed = LearntFeature::from_reinforcement_line(&line).unwrap();
        assert_eq!(parsed.to_reinforcement_line(), line);
        assert_eq!(parsed.scores, vec![1.0, 0.25]);
    }

    #[test]
    fn test_unsorted_duplicated_features_normalize() {
        let raw = LearntFeature::new(
            FeatureSet::from_features(vec![
                Feature::new(5, 1.0),
                Feature::new(2, 0.5),
                Feature::new(5, 9.0),
            ]),
            vec![0.0],
            "t1".to_string(),
            String::new(),
        );

        // Sorted by id, keep-first on the duplicate, no comment marker.
        assert_eq!(raw.to_ranking_line(), "0 qid:t1 2:0.5 5:1");
    }

    #[test]
    fn test_empty_comment_round_trip() {
        let mut rec = record();
        rec.comment = String::new();
        let line = rec.to_ranking_line();
        assert!(!line.contains('#'));

        let parsed = LearntFeature::from_ranking_line(&line).unwrap();
        assert_eq!(parsed.comment, "");
        assert_eq!(parsed.to_ranking_line(), line);
    }

    #[test]
    fn test_malformed_lines_error() {
        assert!(LearntFeature::from_ranking_line("").is_err());
        assert!(LearntFeature::from_ranking_line("1 noqid 1:2").is_err());
        assert!(LearntFeature::from_ranking_line("1 qid:t x").is_err());
        assert!(LearntFeature::from_reinforcement_line("t1 1 2 3").is_err());
    }
}
