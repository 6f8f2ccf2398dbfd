// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Canonical form of request bodies.
//!
//! The gateway verifies a signature over the base64 of the exact bytes we send,
//! so the body has to be rendered the same way every time: compact JSON, object
//! keys sorted byte-wise at every level, arrays kept in order.

use serde::Serialize;
use serde_json::Value;

use crate::{Error, Result};

/// Canonicalize a raw JSON body.
///
/// Returns `None` for an empty input and for the `null` and `{}` sentinels, in
/// which case no `data` parameter takes part in the signature.
pub fn canonicalize(body: &[u8]) -> Result<Option<Vec<u8>>> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| Error::encoding_invalid("request body is not valid json").with_source(e))?;
    canonicalize_value(&value)
}

/// Canonicalize any serializable body.
pub fn canonicalize_serialize<T: Serialize + ?Sized>(body: &T) -> Result<Option<Vec<u8>>> {
    let value = serde_json::to_value(body)
        .map_err(|e| Error::encoding_invalid("request body can't be serialized").with_source(e))?;
    canonicalize_value(&value)
}

/// Canonicalize an already parsed body.
pub fn canonicalize_value(value: &Value) -> Result<Option<Vec<u8>>> {
    match value {
        Value::Null => Ok(None),
        Value::Object(map) if map.is_empty() => Ok(None),
        Value::Object(_) => {
            let mut buf = Vec::with_capacity(128);
            write_value(&mut buf, value)?;
            Ok(Some(buf))
        }
        _ => Err(Error::encoding_invalid(
            "request body must be a json object",
        )),
    }
}

fn write_value(buf: &mut Vec<u8>, value: &Value) -> Result<()> {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<_> = map.iter().collect();
            entries.sort_unstable_by(|(a, _), (b, _)| a.as_bytes().cmp(b.as_bytes()));

            buf.push(b'{');
            for (idx, (k, v)) in entries.into_iter().enumerate() {
                if idx > 0 {
                    buf.push(b',');
                }
                write_scalar(buf, k)?;
                buf.push(b':');
                write_value(buf, v)?;
            }
            buf.push(b'}');
        }
        Value::Array(items) => {
            buf.push(b'[');
            for (idx, v) in items.iter().enumerate() {
                if idx > 0 {
                    buf.push(b',');
                }
                write_value(buf, v)?;
            }
            buf.push(b']');
        }
        scalar => write_scalar(buf, scalar)?,
    }
    Ok(())
}

fn write_scalar<T: Serialize + ?Sized>(buf: &mut Vec<u8>, v: &T) -> Result<()> {
    serde_json::to_writer(buf, v)
        .map_err(|e| Error::encoding_invalid("failed to encode request body").with_source(e))
}
