//! ボリューム定義

use super::{Properties, name_of};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// ブートボリュームを示す名前のサフィックス
pub const BOOT_SUFFIX: &str = "-boot";

/// `imagePassword` プロパティの宣言状態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImagePassword<'a> {
    /// プロパティ自体が無い
    Absent,
    /// 明示的に null（ランダム生成の対象）
    Null,
    /// 値が指定されている
    Given(&'a str),
}

/// ボリューム定義
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    #[serde(default)]
    pub properties: Properties,
}

impl Volume {
    pub fn name(&self) -> &str {
        name_of(&self.properties)
    }

    /// 名前が `-boot` で終わるボリュームはブートボリューム
    pub fn is_boot(&self) -> bool {
        self.name().ends_with(BOOT_SUFFIX)
    }

    pub fn image_password(&self) -> ImagePassword<'_> {
        match self.properties.get("imagePassword") {
            None => ImagePassword::Absent,
            Some(Value::Null) => ImagePassword::Null,
            Some(Value::String(s)) => ImagePassword::Given(s),
            // 文字列以外はAPI側で弾かれるので、そのまま送る
            Some(_) => ImagePassword::Absent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn volume(value: Value) -> Volume {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_boot_flag_follows_suffix() {
        assert!(volume(json!({"properties": {"name": "web1-boot"}})).is_boot());
        assert!(!volume(json!({"properties": {"name": "web1-data"}})).is_boot());
        assert!(!volume(json!({"properties": {"name": "web1-boot-data"}})).is_boot());
    }

    #[test]
    fn test_image_password_states() {
        let absent = volume(json!({"properties": {"name": "a"}}));
        let null = volume(json!({"properties": {"name": "a", "imagePassword": null}}));
        let given = volume(json!({"properties": {"name": "a", "imagePassword": "s3cret"}}));

        assert_eq!(absent.image_password(), ImagePassword::Absent);
        assert_eq!(null.image_password(), ImagePassword::Null);
        assert_eq!(given.image_password(), ImagePassword::Given("s3cret"));
    }
}
