/* Copyright 2026 The Stackcheck Project Developers
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 *     http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

macro_rules! define_features {
    (
        $(#[$outer:meta])*
        pub struct Features: $repr:ty {
            $(
                $(#[$inner:ident $($args:tt)*])*
                pub $field:ident: $const:ident($flag:expr) = $default:expr, $name:literal;
            )*
        }
    ) => {
        bitflags::bitflags! {
            $(#[$outer])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
            pub struct Features: $repr {
                $(
                    $(#[$inner $($args)*])*
                    #[doc = "\nDefaults to `"]
                    #[doc = stringify!($default)]
                    #[doc = "`.\n"]
                    const $const = $flag;
                )*
            }
        }

        impl Default for Features {
            #[inline]
            fn default() -> Self {
                let mut features = Features::empty();
                $(
                    features.set(Features::$const, $default);
                )*
                features
            }
        }

        impl Features {
            /// Every feature flag paired with its kebab-case name, as used on
            /// command lines.
            pub const NAMED: &'static [(&'static str, Features)] = &[
                $(($name, Features::$const),)*
            ];

            $(
                /// Returns whether this feature is enabled in this feature set.
                #[inline]
                pub fn $field(&self) -> bool {
                    self.contains(Features::$const)
                }
            )*

            /// Returns the kebab-case name of a single feature flag.
            pub fn name(&self) -> &'static str {
                $(
                    if *self == Features::$const {
                        return $name;
                    }
                )*
                "unknown"
            }
        }
    };
}

define_features! {
    /// Flags for the WebAssembly proposals that are enabled during validation.
    ///
    /// Every proposal here only widens the set of accepted function bodies:
    /// disabling one never changes how the operand and control stacks
    /// evolve, it only rejects the operators or signatures it gates with
    /// [`ErrorKind::FeatureDisabled`](crate::ErrorKind::FeatureDisabled).
    pub struct Features: u32 {
        /// Blocks with parameters or more than one result, and functions with
        /// more than one result.
        pub multi_value: MULTI_VALUE(1) = true, "multi-value";
        /// The `i32.extend8_s` family of sign-extension operators.
        pub sign_extension: SIGN_EXTENSION(1 << 1) = true, "sign-extension";
        /// The non-trapping `i32.trunc_sat_f32_s` family of conversions.
        pub saturating_float_to_int: SATURATING_FLOAT_TO_INT(1 << 2) = true,
            "saturating-float-to-int";
        /// Memories indexed with `i64` addresses.
        pub memory64: MEMORY64(1 << 3) = false, "memory64";
        /// More than one memory per module.
        pub multi_memory: MULTI_MEMORY(1 << 4) = false, "multi-memory";
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let features = Features::default();
        assert!(features.multi_value());
        assert!(features.sign_extension());
        assert!(features.saturating_float_to_int());
        assert!(!features.memory64());
        assert!(!features.multi_memory());
    }

    #[test]
    fn names() {
        assert_eq!(Features::MEMORY64.name(), "memory64");
        assert_eq!(Features::MULTI_VALUE.name(), "multi-value");
        assert_eq!(Features::NAMED.len(), 5);
        assert!(Features::NAMED
            .iter()
            .all(|(name, flag)| flag.name() == *name));
    }
}
