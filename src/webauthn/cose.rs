//! COSE_Key handling for the one supported key type: EC2, ES256, P-256.

use crate::error::Rejection;
use ciborium::value::{Integer, Value};
use p256::elliptic_curve::sec1::FromEncodedPoint;
use p256::{EncodedPoint, FieldBytes, PublicKey};

pub const LABEL_KTY: i64 = 1;
pub const LABEL_ALG: i64 = 3;
pub const LABEL_CRV: i64 = -1;
pub const LABEL_X: i64 = -2;
pub const LABEL_Y: i64 = -3;

pub const KTY_EC2: i64 = 2;
pub const ALG_ES256: i64 = -7;
pub const CRV_P256: i64 = 1;

pub const COORDINATE_LEN: usize = 32;

/// An ES256 public key on P-256, as affine coordinates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoseKey {
    pub x: [u8; COORDINATE_LEN],
    pub y: [u8; COORDINATE_LEN],
}

impl CoseKey {
    /// Validate a decoded COSE map and extract the coordinates.
    ///
    /// Anything other than alg = ES256 and crv = P-256 is
    /// [`Rejection::UnsupportedAlgorithm`]; structural problems and points
    /// that are not on the curve are [`Rejection::MalformedInput`].
    pub fn from_value(value: &Value) -> Result<Self, Rejection> {
        let map = value
            .as_map()
            .ok_or_else(|| Rejection::malformed("COSE key is not a map"))?;

        let lookup = |label: i64| {
            map.iter().find_map(|(k, v)| match k {
                Value::Integer(i) if i128::from(*i) == label as i128 => Some(v),
                _ => None,
            })
        };
        let int = |label: i64| lookup(label).and_then(as_i64);

        if int(LABEL_ALG) != Some(ALG_ES256) || int(LABEL_CRV) != Some(CRV_P256) {
            return Err(Rejection::UnsupportedAlgorithm);
        }
        if let Some(kty) = lookup(LABEL_KTY) {
            if as_i64(kty) != Some(KTY_EC2) {
                return Err(Rejection::UnsupportedAlgorithm);
            }
        }

        let coordinate = |label: i64, name: &str| -> Result<[u8; COORDINATE_LEN], Rejection> {
            lookup(label)
                .and_then(Value::as_bytes)
                .and_then(|b| b.as_slice().try_into().ok())
                .ok_or_else(|| Rejection::malformed(format!("COSE key {name} coordinate missing or not 32 bytes")))
        };

        let key = Self {
            x: coordinate(LABEL_X, "x")?,
            y: coordinate(LABEL_Y, "y")?,
        };
        key.to_public_key()
            .ok_or_else(|| Rejection::malformed("COSE key is not a point on P-256"))?;

        Ok(key)
    }

    /// Decode a CBOR-encoded COSE key.
    pub fn decode(bytes: &[u8]) -> Result<Self, Rejection> {
        let value: Value = ciborium::from_reader(bytes)
            .map_err(|e| Rejection::malformed(format!("COSE key: {e}")))?;
        Self::from_value(&value)
    }

    /// Rebuild the curve point, `None` if the coordinates are not on P-256.
    pub fn to_public_key(&self) -> Option<PublicKey> {
        let x = FieldBytes::from(self.x);
        let y = FieldBytes::from(self.y);
        let point = EncodedPoint::from_affine_coordinates(&x, &y, false);
        Option::from(PublicKey::from_encoded_point(&point))
    }
}

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Integer(i) => i64::try_from(*i).ok(),
        _ => None,
    }
}

/// Encode a P-256 public key as a COSE_Key CBOR map (kty=2, alg=-7, crv=1, x, y).
pub fn encode_cose_key(
    x: &[u8; COORDINATE_LEN],
    y: &[u8; COORDINATE_LEN],
) -> Result<Vec<u8>, ciborium::ser::Error<std::io::Error>> {
    let int = |v: i64| Value::Integer(Integer::from(v));
    let map = Value::Map(vec![
        (int(LABEL_KTY), int(KTY_EC2)),
        (int(LABEL_ALG), int(ALG_ES256)),
        (int(LABEL_CRV), int(CRV_P256)),
        (int(LABEL_X), Value::Bytes(x.to_vec())),
        (int(LABEL_Y), Value::Bytes(y.to_vec())),
    ]);
    let mut buf = Vec::new();
    ciborium::into_writer(&map, &mut buf)?;
    Ok(buf)
}
