use serde::{Deserialize, Serialize};
use strum::Display;

/// Condition extracted by `flg` from the result of the preceding `cmp`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
pub enum Flag {
    #[strum(serialize = "FLAGS_EQUAL")]
    Equal,
    #[strum(serialize = "FLAGS_LESSEQ")]
    LessEq,
}

#[test]
fn test() {
    assert_eq!(Flag::Equal.to_string(), "FLAGS_EQUAL");
    assert_eq!(Flag::LessEq.to_string(), "FLAGS_LESSEQ");
}
