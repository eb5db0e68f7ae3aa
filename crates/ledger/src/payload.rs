//! Payload checks that run before a block is built.
//!
//! `serde_json` writes NaN and infinities as `null`, so a payload carrying one
//! would be stored and hashed as something other than what the caller passed.
//! [`ensure_finite`] walks the payload's own `Serialize` output and rejects
//! such values instead.

use std::fmt::Display;

use serde::ser::{self, Serialize};

/// The first non-finite float found in a payload.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NonFiniteFloat(String);

impl Display for NonFiniteFloat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for NonFiniteFloat {}

impl ser::Error for NonFiniteFloat {
    fn custom<T: Display>(msg: T) -> Self {
        Self(msg.to_string())
    }
}

type Check = std::result::Result<(), NonFiniteFloat>;

/// Fail if any float inside `payload` is NaN or infinite.
pub(crate) fn ensure_finite<P>(payload: &P) -> Check
where
    P: Serialize + ?Sized,
{
    payload.serialize(FiniteFloats)
}

fn check_float(value: f64) -> Check {
    if value.is_finite() {
        Ok(())
    } else {
        Err(NonFiniteFloat(format!(
            "block payload contains a non-finite number ({value})"
        )))
    }
}

struct FiniteFloats;

impl ser::Serializer for FiniteFloats {
    type Ok = ();
    type Error = NonFiniteFloat;
    type SerializeSeq = Self;
    type SerializeTuple = Self;
    type SerializeTupleStruct = Self;
    type SerializeTupleVariant = Self;
    type SerializeMap = Self;
    type SerializeStruct = Self;
    type SerializeStructVariant = Self;

    fn serialize_f32(self, v: f32) -> Check {
        check_float(f64::from(v))
    }

    fn serialize_f64(self, v: f64) -> Check {
        check_float(v)
    }

    fn serialize_bool(self, _: bool) -> Check {
        Ok(())
    }

    fn serialize_i8(self, _: i8) -> Check {
        Ok(())
    }

    fn serialize_i16(self, _: i16) -> Check {
        Ok(())
    }

    fn serialize_i32(self, _: i32) -> Check {
        Ok(())
    }

    fn serialize_i64(self, _: i64) -> Check {
        Ok(())
    }

    fn serialize_i128(self, _: i128) -> Check {
        Ok(())
    }

    fn serialize_u8(self, _: u8) -> Check {
        Ok(())
    }

    fn serialize_u16(self, _: u16) -> Check {
        Ok(())
    }

    fn serialize_u32(self, _: u32) -> Check {
        Ok(())
    }

    fn serialize_u64(self, _: u64) -> Check {
        Ok(())
    }

    fn serialize_u128(self, _: u128) -> Check {
        Ok(())
    }

    fn serialize_char(self, _: char) -> Check {
        Ok(())
    }

    fn serialize_str(self, _: &str) -> Check {
        Ok(())
    }

    fn serialize_bytes(self, _: &[u8]) -> Check {
        Ok(())
    }

    fn serialize_none(self) -> Check {
        Ok(())
    }

    fn serialize_some<T: Serialize + ?Sized>(self, value: &T) -> Check {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Check {
        Ok(())
    }

    fn serialize_unit_struct(self, _: &'static str) -> Check {
        Ok(())
    }

    fn serialize_unit_variant(self, _: &'static str, _: u32, _: &'static str) -> Check {
        Ok(())
    }

    fn serialize_newtype_struct<T: Serialize + ?Sized>(self, _: &'static str, value: &T) -> Check {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T: Serialize + ?Sized>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        value: &T,
    ) -> Check {
        value.serialize(self)
    }

    fn serialize_seq(self, _: Option<usize>) -> std::result::Result<Self, NonFiniteFloat> {
        Ok(self)
    }

    fn serialize_tuple(self, _: usize) -> std::result::Result<Self, NonFiniteFloat> {
        Ok(self)
    }

    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self, NonFiniteFloat> {
        Ok(self)
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self, NonFiniteFloat> {
        Ok(self)
    }

    fn serialize_map(self, _: Option<usize>) -> std::result::Result<Self, NonFiniteFloat> {
        Ok(self)
    }

    fn serialize_struct(self, _: &'static str, _: usize) -> std::result::Result<Self, NonFiniteFloat> {
        Ok(self)
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> std::result::Result<Self, NonFiniteFloat> {
        Ok(self)
    }
}

impl ser::SerializeSeq for FiniteFloats {
    type Ok = ();
    type Error = NonFiniteFloat;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Check {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Check {
        Ok(())
    }
}

impl ser::SerializeTuple for FiniteFloats {
    type Ok = ();
    type Error = NonFiniteFloat;

    fn serialize_element<T: Serialize + ?Sized>(&mut self, value: &T) -> Check {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Check {
        Ok(())
    }
}

impl ser::SerializeTupleStruct for FiniteFloats {
    type Ok = ();
    type Error = NonFiniteFloat;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Check {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Check {
        Ok(())
    }
}

impl ser::SerializeTupleVariant for FiniteFloats {
    type Ok = ();
    type Error = NonFiniteFloat;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, value: &T) -> Check {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Check {
        Ok(())
    }
}

impl ser::SerializeMap for FiniteFloats {
    type Ok = ();
    type Error = NonFiniteFloat;

    fn serialize_key<T: Serialize + ?Sized>(&mut self, key: &T) -> Check {
        key.serialize(FiniteFloats)
    }

    fn serialize_value<T: Serialize + ?Sized>(&mut self, value: &T) -> Check {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Check {
        Ok(())
    }
}

impl ser::SerializeStruct for FiniteFloats {
    type Ok = ();
    type Error = NonFiniteFloat;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _: &'static str, value: &T) -> Check {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Check {
        Ok(())
    }
}

impl ser::SerializeStructVariant for FiniteFloats {
    type Ok = ();
    type Error = NonFiniteFloat;

    fn serialize_field<T: Serialize + ?Sized>(&mut self, _: &'static str, value: &T) -> Check {
        value.serialize(FiniteFloats)
    }

    fn end(self) -> Check {
        Ok(())
    }
}
