//! Layout declaration macro for fixed-width records.
//!
//! ```text
//! record! {
//!     /// docs
//!     pub struct BundleControl(BundleControl) {
//!         bundle_items_count: u16 = Numeric(4) as "BundleItemsCount",
//!         reserved(24),
//!     }
//! }
//! ```
//!
//! Each slot names the struct field, its Rust type, the codec from
//! [`crate::field`], the width and the field name used in errors and
//! layouts. `reserved(n)` slots are blank on encode and skipped on decode.
//! The record type must provide `fn rules(&self) -> Result<(), FieldError>`.

macro_rules! record {
    (
        $(#[$meta:meta])*
        pub struct $name:ident($kind:ident) {
            $($body:tt)*
        }
    ) => {
        record!(@struct [$(#[$meta])* $name] [] $($body)*);

        impl $crate::record::RecordFormat for $name {
            const KIND: $crate::record::RecordKind = $crate::record::RecordKind::$kind;

            const LAYOUT: &'static [$crate::field::FieldSlot] = record!(@layout [] $($body)*);

            fn decode_fields(
                r: &mut $crate::field::FieldReader<'_>,
            ) -> ::std::result::Result<Self, $crate::error::FieldError> {
                let mut rec = Self::default();
                record!(@decode rec r $($body)*);
                Ok(rec)
            }

            fn encode_fields(&self, out: &mut Vec<u8>) {
                let rec = self;
                record!(@encode rec out $($body)*);
            }

            fn validate(&self) -> ::std::result::Result<(), $crate::error::FieldError> {
                self.rules()
            }
        }
    };

    // === struct ===
    (@struct [$(#[$meta:meta])* $name:ident] [$($fields:tt)*]) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            $($fields)*
        }
    };
    (@struct $head:tt [$($fields:tt)*] reserved($w:expr), $($rest:tt)*) => {
        record!(@struct $head [$($fields)*] $($rest)*);
    };
    (@struct $head:tt [$($fields:tt)*]
        $(#[$m:meta])* $field:ident: $ty:ty = $codec:ident($w:expr) as $label:literal, $($rest:tt)*
    ) => {
        record!(@struct $head [$($fields)* $(#[$m])* pub $field: $ty,] $($rest)*);
    };

    // === decode ===
    (@decode $rec:ident $r:ident) => {};
    (@decode $rec:ident $r:ident reserved($w:expr), $($rest:tt)*) => {
        $r.skip($w);
        record!(@decode $rec $r $($rest)*);
    };
    (@decode $rec:ident $r:ident
        $(#[$m:meta])* $field:ident: $ty:ty = $codec:ident($w:expr) as $label:literal, $($rest:tt)*
    ) => {
        $rec.$field = $r.read::<$crate::field::$codec, $ty>($w, $label)?;
        record!(@decode $rec $r $($rest)*);
    };

    // === encode ===
    (@encode $rec:ident $out:ident) => {};
    (@encode $rec:ident $out:ident reserved($w:expr), $($rest:tt)*) => {
        $crate::field::encode_reserved($w, $out);
        record!(@encode $rec $out $($rest)*);
    };
    (@encode $rec:ident $out:ident
        $(#[$m:meta])* $field:ident: $ty:ty = $codec:ident($w:expr) as $label:literal, $($rest:tt)*
    ) => {
        <$crate::field::$codec as $crate::field::Codec<$ty>>::encode(&$rec.$field, $w, $out);
        record!(@encode $rec $out $($rest)*);
    };

    // === layout ===
    (@layout [$($slots:tt)*]) => {
        &[$($slots)*]
    };
    (@layout [$($slots:tt)*] reserved($w:expr), $($rest:tt)*) => {
        record!(@layout [$($slots)*
            $crate::field::FieldSlot {
                name: "reserved",
                width: $w,
                codec: $crate::field::CodecKind::Reserved,
            },
        ] $($rest)*)
    };
    (@layout [$($slots:tt)*]
        $(#[$m:meta])* $field:ident: $ty:ty = $codec:ident($w:expr) as $label:literal, $($rest:tt)*
    ) => {
        record!(@layout [$($slots)*
            $crate::field::FieldSlot {
                name: $label,
                width: $w,
                codec: <$crate::field::$codec as $crate::field::Codec<$ty>>::KIND,
            },
        ] $($rest)*)
    };
}
