//! Sorted-set commands.

use skate_ffi::{RequestType, Value};

use super::{fmt_float, fmt_int};
use crate::client::Client;
use crate::error::{Error, Result};
use crate::response;

/// Existence condition for `ZADD`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZAddConditional {
    /// `XX`: only update existing members.
    OnlyIfExists,
    /// `NX`: only add new members.
    OnlyIfDoesNotExist,
}

/// Score-comparison condition for `ZADD`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ZAddComparison {
    /// `GT`: only update when the new score is greater.
    GreaterThan,
    /// `LT`: only update when the new score is less.
    LessThan,
}

/// Optional clauses for [`Client::zadd_with_options`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ZAddOptions {
    pub conditional: Option<ZAddConditional>,
    pub comparison: Option<ZAddComparison>,
    /// `CH`: count changed members instead of only added ones.
    pub count_changed: bool,
}

impl ZAddOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn conditional(mut self, conditional: ZAddConditional) -> Self {
        self.conditional = Some(conditional);
        self
    }

    pub fn comparison(mut self, comparison: ZAddComparison) -> Self {
        self.comparison = Some(comparison);
        self
    }

    pub fn count_changed(mut self) -> Self {
        self.count_changed = true;
        self
    }

    pub(crate) fn append_args(&self, args: &mut Vec<Vec<u8>>) -> Result<()> {
        // The server rejects GT/LT combined with NX; catch it locally.
        if self.comparison.is_some() && self.conditional == Some(ZAddConditional::OnlyIfDoesNotExist)
        {
            return Err(Error::InvalidArgument(
                "GT and LT cannot be combined with NX".into(),
            ));
        }
        match self.conditional {
            Some(ZAddConditional::OnlyIfExists) => args.push(b"XX".to_vec()),
            Some(ZAddConditional::OnlyIfDoesNotExist) => args.push(b"NX".to_vec()),
            None => {}
        }
        match self.comparison {
            Some(ZAddComparison::GreaterThan) => args.push(b"GT".to_vec()),
            Some(ZAddComparison::LessThan) => args.push(b"LT".to_vec()),
            None => {}
        }
        if self.count_changed {
            args.push(b"CH".to_vec());
        }
        Ok(())
    }
}

fn score_reply(value: Value) -> Result<f64> {
    match value {
        Value::Double(v) => Ok(v),
        Value::Int(v) => Ok(v as f64),
        Value::Bytes(bytes) => std::str::from_utf8(&bytes)
            .ok()
            .and_then(parse_score)
            .ok_or(Error::UnexpectedResponse {
                expected: "double",
                actual: "bytes",
            }),
        Value::ServerError(message) => Err(Error::Command(message)),
        other => Err(Error::UnexpectedResponse {
            expected: "double",
            actual: other.kind_str(),
        }),
    }
}

fn parse_score(text: &str) -> Option<f64> {
    match text {
        "inf" | "+inf" => Some(f64::INFINITY),
        "-inf" => Some(f64::NEG_INFINITY),
        other => other.parse().ok(),
    }
}

impl Client {
    /// Adds the scored members; returns how many were newly added.
    pub fn zadd(
        &self,
        key: impl Into<Vec<u8>>,
        members: impl IntoIterator<Item = (f64, impl Into<Vec<u8>>)>,
    ) -> Result<i64> {
        self.zadd_with_options(key, members, &ZAddOptions::new())
    }

    pub fn zadd_with_options(
        &self,
        key: impl Into<Vec<u8>>,
        members: impl IntoIterator<Item = (f64, impl Into<Vec<u8>>)>,
        options: &ZAddOptions,
    ) -> Result<i64> {
        let mut args = vec![key.into()];
        options.append_args(&mut args)?;
        for (score, member) in members {
            args.push(fmt_float(score));
            args.push(member.into());
        }
        let value = self.execute(RequestType::ZAdd, args)?;
        response::expect_int(value)
    }

    pub fn zrem(
        &self,
        key: impl Into<Vec<u8>>,
        members: impl IntoIterator<Item = impl Into<Vec<u8>>>,
    ) -> Result<i64> {
        let mut args = vec![key.into()];
        args.extend(members.into_iter().map(Into::into));
        let value = self.execute(RequestType::ZRem, args)?;
        response::expect_int(value)
    }

    /// Members between rank `start` and `stop` inclusive, lowest score
    /// first.
    pub fn zrange(&self, key: impl Into<Vec<u8>>, start: i64, stop: i64) -> Result<Vec<Vec<u8>>> {
        let value = self.execute(
            RequestType::ZRange,
            vec![key.into(), fmt_int(start), fmt_int(stop)],
        )?;
        response::expect_array(value)?
            .into_iter()
            .map(response::expect_bytes)
            .collect()
    }

    /// Like [`Client::zrange`] but paired with scores.
    pub fn zrange_with_scores(
        &self,
        key: impl Into<Vec<u8>>,
        start: i64,
        stop: i64,
    ) -> Result<Vec<(Vec<u8>, f64)>> {
        let value = self.execute(
            RequestType::ZRange,
            vec![
                key.into(),
                fmt_int(start),
                fmt_int(stop),
                b"WITHSCORES".to_vec(),
            ],
        )?;
        response::expect_pairs(value)?
            .into_iter()
            .map(|(member, score)| Ok((response::expect_bytes(member)?, score_reply(score)?)))
            .collect()
    }

    pub fn zcard(&self, key: impl Into<Vec<u8>>) -> Result<i64> {
        let value = self.execute(RequestType::ZCard, vec![key.into()])?;
        response::expect_int(value)
    }

    pub fn zscore(
        &self,
        key: impl Into<Vec<u8>>,
        member: impl Into<Vec<u8>>,
    ) -> Result<Option<f64>> {
        match self.execute(RequestType::ZScore, vec![key.into(), member.into()])? {
            Value::Nil => Ok(None),
            other => score_reply(other).map(Some),
        }
    }

    pub fn zincr_by(
        &self,
        key: impl Into<Vec<u8>>,
        delta: f64,
        member: impl Into<Vec<u8>>,
    ) -> Result<f64> {
        let value = self.execute(
            RequestType::ZIncrBy,
            vec![key.into(), fmt_float(delta), member.into()],
        )?;
        score_reply(value)
    }

    /// Zero-based rank by ascending score; `None` for a missing member.
    pub fn zrank(
        &self,
        key: impl Into<Vec<u8>>,
        member: impl Into<Vec<u8>>,
    ) -> Result<Option<i64>> {
        match self.execute(RequestType::ZRank, vec![key.into(), member.into()])? {
            Value::Nil => Ok(None),
            other => response::expect_int(other).map(Some),
        }
    }

    /// Counts members with scores in the inclusive `[min, max]` range.
    pub fn zcount(&self, key: impl Into<Vec<u8>>, min: f64, max: f64) -> Result<i64> {
        let value = self.execute(
            RequestType::ZCount,
            vec![key.into(), fmt_float(min), fmt_float(max)],
        )?;
        response::expect_int(value)
    }

    /// Removes and returns the lowest-scored member.
    pub fn zpopmin(&self, key: impl Into<Vec<u8>>) -> Result<Option<(Vec<u8>, f64)>> {
        let value = self.execute(RequestType::ZPopMin, vec![key.into()])?;
        popped_member(value)
    }

    pub fn zpopmax(&self, key: impl Into<Vec<u8>>) -> Result<Option<(Vec<u8>, f64)>> {
        let value = self.execute(RequestType::ZPopMax, vec![key.into()])?;
        popped_member(value)
    }
}

fn popped_member(value: Value) -> Result<Option<(Vec<u8>, f64)>> {
    let mut items = response::expect_array(value)?;
    if items.is_empty() {
        return Ok(None);
    }
    if items.len() != 2 {
        return Err(Error::UnexpectedResponse {
            expected: "member/score pair",
            actual: "array",
        });
    }
    let score = score_reply(items.pop().unwrap_or(Value::Nil))?;
    let member = response::expect_bytes(items.pop().unwrap_or(Value::Nil))?;
    Ok(Some((member, score)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered(options: &ZAddOptions) -> Vec<String> {
        let mut args = Vec::new();
        options.append_args(&mut args).unwrap();
        args.into_iter()
            .map(|arg| String::from_utf8(arg).unwrap())
            .collect()
    }

    #[test]
    fn zadd_options_encode_clauses_in_order() {
        let options = ZAddOptions::new()
            .conditional(ZAddConditional::OnlyIfExists)
            .comparison(ZAddComparison::GreaterThan)
            .count_changed();
        assert_eq!(rendered(&options), vec!["XX", "GT", "CH"]);
    }

    #[test]
    fn nx_with_comparison_is_rejected_locally() {
        let options = ZAddOptions::new()
            .conditional(ZAddConditional::OnlyIfDoesNotExist)
            .comparison(ZAddComparison::LessThan);
        let mut args = Vec::new();
        assert!(matches!(
            options.append_args(&mut args),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn score_replies_accept_infinities() {
        assert_eq!(score_reply(Value::from("+inf")).unwrap(), f64::INFINITY);
        assert_eq!(score_reply(Value::from("-inf")).unwrap(), f64::NEG_INFINITY);
        assert_eq!(score_reply(Value::Double(0.5)).unwrap(), 0.5);
    }

    #[test]
    fn popped_members_handle_empty_replies() {
        assert_eq!(popped_member(Value::Array(Vec::new())).unwrap(), None);
        let pair = Value::Array(vec![Value::from("m"), Value::Double(1.5)]);
        assert_eq!(popped_member(pair).unwrap(), Some((b"m".to_vec(), 1.5)));
    }
}
