//! Aggregation of decrypted ballots into per-question results.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::model::election::{Answer, AnswerSet, Election, QuestionId, QuestionKind};

/// The aggregated outcome of an election.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElectionResult {
    /// Number of decrypted ballots that went into the tally.
    pub total_ballots: usize,
    /// Per-question results, in canonical configuration order.
    pub questions: IndexMap<QuestionId, QuestionTally>,
}

/// The aggregated outcome of a single question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum QuestionTally {
    Select(SelectTally),
    Rank(RankTally),
    Text(TextTally),
}

/// Select outcome: per-choice counts, winners keep all ties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectTally {
    pub counts: Vec<u64>,
    pub percentages: Vec<f64>,
    /// Choice indices achieving the maximum count.
    pub winners: Vec<usize>,
}

/// Rank outcome: per-choice position sums, lower scores are better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankTally {
    pub scores: Vec<u64>,
    pub percentages: Vec<f64>,
    /// Choice indices achieving the minimum score.
    pub winners: Vec<usize>,
}

/// Text outcome: distinct answers grouped by exact match, in first-seen
/// order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextTally {
    pub counts: IndexMap<String, u64>,
    pub percentages: IndexMap<String, f64>,
    /// Answers achieving the maximum count.
    pub winners: Vec<String>,
}

/// Round to two decimal places, the precision results are reported at.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Aggregate decrypted ballots into per-question results. A ballot that
/// carries no (or a mismatched) answer for a question simply does not
/// contribute to it; the percentage denominator stays the total ballot
/// count throughout.
pub fn tally(election: &Election, ballots: &[AnswerSet]) -> ElectionResult {
    let total = ballots.len();
    let mut questions = IndexMap::new();

    for question in election.questions() {
        let answers = ballots.iter().filter_map(|ballot| ballot.get(&question.id));
        let result = match &question.kind {
            QuestionKind::Select { choices, .. } => QuestionTally::Select(tally_select(
                choices.len(),
                total,
                answers.filter_map(|answer| match answer {
                    Answer::Select(flags) if flags.len() == choices.len() => Some(flags),
                    _ => None,
                }),
            )),
            QuestionKind::Rank { choices } => QuestionTally::Rank(tally_rank(
                choices.len(),
                total,
                answers.filter_map(|answer| match answer {
                    Answer::Rank(positions) if positions.len() == choices.len() => Some(positions),
                    _ => None,
                }),
            )),
            QuestionKind::Text { .. } => QuestionTally::Text(tally_text(
                total,
                answers.filter_map(|answer| match answer {
                    Answer::Text(texts) => Some(texts),
                    _ => None,
                }),
            )),
        };
        questions.insert(question.id.clone(), result);
    }

    ElectionResult {
        total_ballots: total,
        questions,
    }
}

fn tally_select<'b>(
    num_choices: usize,
    total: usize,
    answers: impl Iterator<Item = &'b Vec<bool>>,
) -> SelectTally {
    let mut counts = vec![0u64; num_choices];
    for flags in answers {
        for (count, &flag) in counts.iter_mut().zip(flags) {
            *count += u64::from(flag);
        }
    }
    let percentages = counts
        .iter()
        .map(|&count| {
            if total == 0 {
                0.0
            } else {
                round2(100.0 * count as f64 / total as f64)
            }
        })
        .collect();
    let winners = if total == 0 {
        Vec::new()
    } else {
        let best = counts.iter().copied().max().unwrap_or(0);
        (0..num_choices).filter(|&i| counts[i] == best).collect()
    };
    SelectTally {
        counts,
        percentages,
        winners,
    }
}

fn tally_rank<'b>(
    num_choices: usize,
    total: usize,
    answers: impl Iterator<Item = &'b Vec<u32>>,
) -> RankTally {
    let mut scores = vec![0u64; num_choices];
    for positions in answers {
        for (score, &position) in scores.iter_mut().zip(positions) {
            *score += u64::from(position);
        }
    }
    let total_score: u64 = scores.iter().sum();
    let percentages = scores
        .iter()
        .map(|&score| {
            if total == 0 || total_score == 0 {
                0.0
            } else {
                round2(100.0 * (1.0 - score as f64 / total_score as f64))
            }
        })
        .collect();
    let winners = if total == 0 {
        Vec::new()
    } else {
        let best = scores.iter().copied().min().unwrap_or(0);
        (0..num_choices).filter(|&i| scores[i] == best).collect()
    };
    RankTally {
        scores,
        percentages,
        winners,
    }
}

fn tally_text<'b>(
    total: usize,
    answers: impl Iterator<Item = &'b Vec<String>>,
) -> TextTally {
    let mut counts: IndexMap<String, u64> = IndexMap::new();
    for texts in answers {
        for text in texts {
            *counts.entry(text.clone()).or_insert(0) += 1;
        }
    }
    let percentages = counts
        .iter()
        .map(|(text, &count)| {
            let percentage = if total == 0 {
                0.0
            } else {
                round2(100.0 * count as f64 / total as f64)
            };
            (text.clone(), percentage)
        })
        .collect();
    let winners = if counts.is_empty() {
        Vec::new()
    } else {
        let best = counts.values().copied().max().unwrap_or(0);
        counts
            .iter()
            .filter(|(_, &count)| count == best)
            .map(|(text, _)| text.clone())
            .collect()
    };
    TextTally {
        counts,
        percentages,
        winners,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::election::{ConfigNode, Configuration, Question};

    fn election_with(kind: QuestionKind) -> Election {
        let mut election = Election::example();
        election.configuration = Configuration {
            title: "Tally test".to_string(),
            children: vec![ConfigNode::Question(Question {
                id: "q".to_string(),
                title: "The question".to_string(),
                kind,
            })],
        };
        election
    }

    fn ballots(answers: Vec<Answer>) -> Vec<AnswerSet> {
        answers
            .into_iter()
            .map(|answer| AnswerSet::from([("q".to_string(), answer)]))
            .collect()
    }

    #[test]
    fn select_counts_percentages_and_winner() {
        let election = election_with(QuestionKind::Select {
            choices: vec!["A".to_string(), "B".to_string()],
            min: 1,
            max: 1,
        });
        let ballots = ballots(vec![
            Answer::Select(vec![true, false]),
            Answer::Select(vec![true, false]),
            Answer::Select(vec![false, true]),
        ]);
        let result = tally(&election, &ballots);
        let QuestionTally::Select(select) = &result.questions["q"] else {
            panic!("expected a select tally");
        };
        assert_eq!(select.counts, vec![2, 1]);
        assert_eq!(select.percentages, vec![66.67, 33.33]);
        assert_eq!(select.winners, vec![0]);
    }

    #[test]
    fn rank_full_reversal_is_a_tie() {
        let election = election_with(QuestionKind::Rank {
            choices: vec!["A".to_string(), "B".to_string()],
        });
        let ballots = ballots(vec![Answer::Rank(vec![0, 1]), Answer::Rank(vec![1, 0])]);
        let result = tally(&election, &ballots);
        let QuestionTally::Rank(rank) = &result.questions["q"] else {
            panic!("expected a rank tally");
        };
        assert_eq!(rank.scores, vec![1, 1]);
        assert_eq!(rank.percentages, vec![50.0, 50.0]);
        assert_eq!(rank.winners, vec![0, 1]);
    }

    #[test]
    fn rank_prefers_lower_scores() {
        let election = election_with(QuestionKind::Rank {
            choices: vec!["A".to_string(), "B".to_string(), "C".to_string()],
        });
        let ballots = ballots(vec![
            Answer::Rank(vec![0, 1, 2]),
            Answer::Rank(vec![0, 2, 1]),
        ]);
        let result = tally(&election, &ballots);
        let QuestionTally::Rank(rank) = &result.questions["q"] else {
            panic!("expected a rank tally");
        };
        assert_eq!(rank.scores, vec![0, 3, 3]);
        assert_eq!(rank.winners, vec![0]);
    }

    #[test]
    fn text_groups_by_exact_match() {
        let election = election_with(QuestionKind::Text {
            fields: vec!["Answer".to_string()],
            max_length: 8,
            pattern: None,
        });
        let ballots = ballots(vec![
            Answer::Text(vec!["A".to_string()]),
            Answer::Text(vec!["A".to_string()]),
            Answer::Text(vec!["B".to_string()]),
        ]);
        let result = tally(&election, &ballots);
        let QuestionTally::Text(text) = &result.questions["q"] else {
            panic!("expected a text tally");
        };
        assert_eq!(text.counts["A"], 2);
        assert_eq!(text.counts["B"], 1);
        assert_eq!(text.winners, vec!["A".to_string()]);
    }

    #[test]
    fn zero_ballots_yield_empty_winners() {
        let election = election_with(QuestionKind::Select {
            choices: vec!["A".to_string(), "B".to_string()],
            min: 1,
            max: 1,
        });
        let result = tally(&election, &[]);
        let QuestionTally::Select(select) = &result.questions["q"] else {
            panic!("expected a select tally");
        };
        assert_eq!(result.total_ballots, 0);
        assert_eq!(select.counts, vec![0, 0]);
        assert_eq!(select.percentages, vec![0.0, 0.0]);
        assert!(select.winners.is_empty());
    }

    #[test]
    fn ballots_missing_an_answer_keep_the_full_denominator() {
        let election = election_with(QuestionKind::Select {
            choices: vec!["A".to_string(), "B".to_string()],
            min: 1,
            max: 1,
        });
        let mut ballots = ballots(vec![
            Answer::Select(vec![true, false]),
            Answer::Select(vec![true, false]),
        ]);
        ballots.push(AnswerSet::new());
        ballots.push(AnswerSet::new());
        let result = tally(&election, &ballots);
        let QuestionTally::Select(select) = &result.questions["q"] else {
            panic!("expected a select tally");
        };
        assert_eq!(select.counts, vec![2, 0]);
        assert_eq!(select.percentages, vec![50.0, 0.0]);
    }
}
