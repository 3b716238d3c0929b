//! Ballot plaintext codec.
//!
//! A ballot serializes to one line per question, in the canonical
//! (depth-first) configuration order: `<tag>:<question-id>:<values>`,
//! newline-terminated. Select values are `0`/`1` flags, rank values are the
//! destination position per choice, and text answers are base64-wrapped to
//! mark their boundaries. The concatenated lines are padded to the
//! election's exact ballot size and split into equal chunks for encryption.

use data_encoding::BASE64;
use rand::RngCore;

use crate::error::{Error, Result, ValidationError};
use crate::model::election::{validate_answers, Answer, AnswerSet, Election, QuestionKind};

/// Separates the ballot content from the random filler. Content bytes are
/// line text, digits, commas and base64, so the delimiter cannot occur
/// inside them.
const PAD_DELIMITER: u8 = 0;

/// Serialize, pad and chunk an answer set. Answers are validated against
/// the election configuration first; nothing leaves this function on a
/// validation failure.
pub fn encode(election: &Election, answers: &AnswerSet) -> Result<Vec<Vec<u8>>> {
    validate_answers(&election.configuration, answers)?;
    let chunk_size = election.chunk_size()?;

    let mut plaintext = Vec::with_capacity(election.ballot_size);
    for question in election.questions() {
        let values = match &answers[&question.id] {
            Answer::Select(flags) => flags
                .iter()
                .map(|&flag| if flag { "1" } else { "0" })
                .collect::<Vec<_>>()
                .join(","),
            Answer::Rank(positions) => positions
                .iter()
                .map(|position| position.to_string())
                .collect::<Vec<_>>()
                .join(","),
            Answer::Text(texts) => texts
                .iter()
                .map(|text| BASE64.encode(text.as_bytes()))
                .collect::<Vec<_>>()
                .join(","),
        };
        plaintext.extend_from_slice(question.tag().as_bytes());
        plaintext.push(b':');
        plaintext.extend_from_slice(question.id.as_bytes());
        plaintext.push(b':');
        plaintext.extend_from_slice(values.as_bytes());
        plaintext.push(b'\n');
    }

    if plaintext.len() > election.ballot_size {
        return Err(Error::InvalidConfiguration(format!(
            "encoded ballot of {} bytes does not fit the ballot size of {}",
            plaintext.len(),
            election.ballot_size
        )));
    }
    if plaintext.len() < election.ballot_size {
        plaintext.push(PAD_DELIMITER);
        let mut filler = vec![0u8; election.ballot_size - plaintext.len()];
        rand::thread_rng().fill_bytes(&mut filler);
        plaintext.extend_from_slice(&filler);
    }

    Ok(plaintext
        .chunks(chunk_size)
        .map(<[u8]>::to_vec)
        .collect())
}

/// The exact inverse of [`encode`]: reassemble the chunks, strip the
/// filler and parse the answer lines back into an answer set.
pub fn decode(election: &Election, chunks: &[impl AsRef<[u8]>]) -> Result<AnswerSet> {
    let plaintext: Vec<u8> = chunks
        .iter()
        .flat_map(|chunk| chunk.as_ref().iter().copied())
        .collect();
    if plaintext.len() != election.ballot_size {
        return Err(ValidationError::MalformedBallot(format!(
            "expected {} bytes of plaintext, got {}",
            election.ballot_size,
            plaintext.len()
        ))
        .into());
    }

    let content_len = plaintext
        .iter()
        .position(|&byte| byte == PAD_DELIMITER)
        .unwrap_or(plaintext.len());
    let content = std::str::from_utf8(&plaintext[..content_len])
        .map_err(|_| ValidationError::MalformedBallot("content is not UTF-8".to_string()))?;

    let mut answers = AnswerSet::new();
    for line in content.lines() {
        let mut parts = line.splitn(3, ':');
        let (tag, id, values) = match (parts.next(), parts.next(), parts.next()) {
            (Some(tag), Some(id), Some(values)) => (tag, id, values),
            _ => {
                return Err(
                    ValidationError::MalformedBallot(format!("unparsable line {line:?}")).into(),
                )
            }
        };
        let question =
            election
                .configuration
                .question(id)
                .ok_or_else(|| ValidationError::UnknownQuestion {
                    question: id.to_string(),
                })?;
        if tag != question.tag() {
            return Err(ValidationError::MalformedBallot(format!(
                "tag {tag:?} does not match question {id}"
            ))
            .into());
        }
        let answer = match &question.kind {
            QuestionKind::Select { .. } => Answer::Select(
                values
                    .split(',')
                    .map(|value| match value {
                        "0" => Ok(false),
                        "1" => Ok(true),
                        other => Err(ValidationError::MalformedBallot(format!(
                            "bad select flag {other:?}"
                        ))),
                    })
                    .collect::<std::result::Result<_, _>>()?,
            ),
            QuestionKind::Rank { .. } => Answer::Rank(
                values
                    .split(',')
                    .map(|value| {
                        value.parse::<u32>().map_err(|_| {
                            ValidationError::MalformedBallot(format!("bad rank value {value:?}"))
                        })
                    })
                    .collect::<std::result::Result<_, _>>()?,
            ),
            QuestionKind::Text { .. } => Answer::Text(
                values
                    .split(',')
                    .map(|value| {
                        let bytes = BASE64.decode(value.as_bytes()).map_err(|_| {
                            ValidationError::MalformedBallot(format!("bad base64 {value:?}"))
                        })?;
                        String::from_utf8(bytes).map_err(|_| {
                            ValidationError::MalformedBallot("text answer is not UTF-8".to_string())
                        })
                    })
                    .collect::<std::result::Result<_, _>>()?,
            ),
        };
        answers.insert(question.id.clone(), answer);
    }

    Ok(answers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::election::{ConfigNode, Configuration, Question};

    fn election() -> Election {
        let mut election = Election::example();
        election.configuration = Configuration {
            title: "Codec test".to_string(),
            children: vec![
                ConfigNode::Subject(crate::model::election::Subject {
                    id: "s1".to_string(),
                    title: "Board".to_string(),
                    children: vec![ConfigNode::Question(Question {
                        id: "q1".to_string(),
                        title: "Members".to_string(),
                        kind: QuestionKind::Select {
                            choices: vec!["Ann".to_string(), "Ben".to_string(), "Cat".to_string()],
                            min: 0,
                            max: 2,
                        },
                    })],
                }),
                ConfigNode::Question(Question {
                    id: "q2".to_string(),
                    title: "Venues".to_string(),
                    kind: QuestionKind::Rank {
                        choices: vec!["North".to_string(), "South".to_string(), "West".to_string()],
                    },
                }),
                ConfigNode::Question(Question {
                    id: "q3".to_string(),
                    title: "Motto".to_string(),
                    kind: QuestionKind::Text {
                        fields: vec!["Motto".to_string()],
                        max_length: 16,
                        pattern: None,
                    },
                }),
            ],
        };
        election.ballot_size = 116;
        election.chunks_per_ballot = 4;
        election
    }

    fn answers() -> AnswerSet {
        AnswerSet::from([
            ("q1".to_string(), Answer::Select(vec![true, false, true])),
            ("q2".to_string(), Answer::Rank(vec![2, 0, 1])),
            (
                "q3".to_string(),
                Answer::Text(vec!["vox populi".to_string()]),
            ),
        ])
    }

    #[test]
    fn round_trips_all_answer_kinds() {
        let election = election();
        let chunks = encode(&election, &answers()).unwrap();
        assert_eq!(decode(&election, &chunks).unwrap(), answers());
    }

    #[test]
    fn emits_exact_chunk_count_and_size() {
        let election = election();
        let chunks = encode(&election, &answers()).unwrap();
        assert_eq!(chunks.len(), election.chunks_per_ballot);
        for chunk in &chunks {
            assert_eq!(chunk.len(), election.ballot_size / election.chunks_per_ballot);
        }
    }

    #[test]
    fn round_trips_without_padding() {
        // "select:q1:1,0\n" is exactly 14 bytes, leaving no room for filler.
        let mut election = Election::example();
        election.configuration = Configuration {
            title: "Exact fit".to_string(),
            children: vec![ConfigNode::Question(Question {
                id: "q1".to_string(),
                title: "Chair".to_string(),
                kind: QuestionKind::Select {
                    choices: vec!["Ann".to_string(), "Ben".to_string()],
                    min: 1,
                    max: 1,
                },
            })],
        };
        election.ballot_size = 14;
        election.chunks_per_ballot = 2;
        let answers = AnswerSet::from([("q1".to_string(), Answer::Select(vec![true, false]))]);
        let chunks = encode(&election, &answers).unwrap();
        assert_eq!(chunks.iter().map(Vec::len).sum::<usize>(), 14);
        assert_eq!(decode(&election, &chunks).unwrap(), answers);
    }

    #[test]
    fn text_answers_with_separators_survive() {
        let mut election = election();
        election.ballot_size = 116;
        let mut answers = answers();
        answers.insert(
            "q3".to_string(),
            Answer::Text(vec!["a,b:c\nd".to_string()]),
        );
        let chunks = encode(&election, &answers).unwrap();
        assert_eq!(decode(&election, &chunks).unwrap(), answers);
    }

    #[test]
    fn oversized_content_is_a_configuration_error() {
        let mut election = election();
        election.ballot_size = 32;
        election.chunks_per_ballot = 2;
        assert!(matches!(
            encode(&election, &answers()),
            Err(Error::InvalidConfiguration(_))
        ));
    }

    #[test]
    fn rejects_ballots_of_the_wrong_size() {
        let election = election();
        let chunks = vec![vec![0u8; 3]];
        assert!(decode(&election, &chunks).is_err());
    }
}
