//! Claim record and the closed vocabularies its fields are drawn from.
//!
//! Serde renames map every field and variant to the Chinese header and
//! value text used in the flat file, so the same labels flow into the
//! relational store, the charts and the workbook.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    #[serde(rename = "男")]
    Male,
    #[serde(rename = "女")]
    Female,
}

impl Gender {
    pub const ALL: [Gender; 2] = [Gender::Male, Gender::Female];

    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "男",
            Gender::Female => "女",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VehicleCategory {
    #[serde(rename = "经济型")]
    Economy,
    #[serde(rename = "SUV")]
    Suv,
    #[serde(rename = "豪华型")]
    Luxury,
}

impl VehicleCategory {
    pub const ALL: [VehicleCategory; 3] = [
        VehicleCategory::Economy,
        VehicleCategory::Suv,
        VehicleCategory::Luxury,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            VehicleCategory::Economy => "经济型",
            VehicleCategory::Suv => "SUV",
            VehicleCategory::Luxury => "豪华型",
        }
    }

    pub fn ascii_label(&self) -> &'static str {
        match self {
            VehicleCategory::Economy => "Economy",
            VehicleCategory::Suv => "SUV",
            VehicleCategory::Luxury => "Luxury",
        }
    }

    /// Models a record of this category may carry.
    pub fn models(&self) -> &'static [&'static str] {
        match self {
            VehicleCategory::Economy => &["丰田卡罗拉", "大众朗逸", "本田思域", "日产轩逸"],
            VehicleCategory::Suv => &["哈弗H6", "吉利博越", "大众途观", "本田CR-V"],
            VehicleCategory::Luxury => &["奔驰C级", "宝马3系", "奥迪A4L", "特斯拉Model 3"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "渝中区")]
    Yuzhong,
    #[serde(rename = "江北区")]
    Jiangbei,
    #[serde(rename = "南岸区")]
    Nanan,
    #[serde(rename = "九龙坡区")]
    Jiulongpo,
    #[serde(rename = "沙坪坝区")]
    Shapingba,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::Yuzhong,
        Region::Jiangbei,
        Region::Nanan,
        Region::Jiulongpo,
        Region::Shapingba,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Region::Yuzhong => "渝中区",
            Region::Jiangbei => "江北区",
            Region::Nanan => "南岸区",
            Region::Jiulongpo => "九龙坡区",
            Region::Shapingba => "沙坪坝区",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ClaimCause {
    #[serde(rename = "碰撞")]
    Collision,
    #[serde(rename = "刮擦")]
    Scratch,
    #[serde(rename = "自然灾害（水淹）")]
    Flood,
    #[serde(rename = "盗抢")]
    Theft,
    #[serde(rename = "玻璃破损")]
    GlassBreakage,
    #[serde(rename = "第三者责任")]
    ThirdPartyLiability,
}

impl ClaimCause {
    pub const ALL: [ClaimCause; 6] = [
        ClaimCause::Collision,
        ClaimCause::Scratch,
        ClaimCause::Flood,
        ClaimCause::Theft,
        ClaimCause::GlassBreakage,
        ClaimCause::ThirdPartyLiability,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ClaimCause::Collision => "碰撞",
            ClaimCause::Scratch => "刮擦",
            ClaimCause::Flood => "自然灾害（水淹）",
            ClaimCause::Theft => "盗抢",
            ClaimCause::GlassBreakage => "玻璃破损",
            ClaimCause::ThirdPartyLiability => "第三者责任",
        }
    }

    pub fn ascii_label(&self) -> &'static str {
        match self {
            ClaimCause::Collision => "Collision",
            ClaimCause::Scratch => "Scratch",
            ClaimCause::Flood => "Flood",
            ClaimCause::Theft => "Theft",
            ClaimCause::GlassBreakage => "Glass",
            ClaimCause::ThirdPartyLiability => "Third party",
        }
    }
}

macro_rules! display_label {
    ($($ty:ty),*) => {
        $(impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        })*
    };
}

display_label!(Gender, VehicleCategory, Region, ClaimCause);

/// One synthetic insurance claim, one row of the flat file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimRecord {
    #[serde(rename = "保单号")]
    pub policy_id: String,
    #[serde(rename = "客户性别")]
    pub gender: Gender,
    #[serde(rename = "客户年龄")]
    pub age: u8,
    #[serde(rename = "车型类别")]
    pub vehicle_category: VehicleCategory,
    #[serde(rename = "具体车型")]
    pub vehicle_model: String,
    #[serde(rename = "车龄(年)")]
    pub vehicle_age: u8,
    #[serde(rename = "投保地区")]
    pub region: Region,
    #[serde(rename = "出险原因")]
    pub claim_cause: ClaimCause,
    #[serde(rename = "理赔金额(元)")]
    pub claim_amount: f64,
    #[serde(rename = "出险时间", with = "timestamp_format")]
    pub claimed_at: NaiveDateTime,
}

impl ClaimRecord {
    /// Whether the model is one of the models listed for the record's category.
    pub fn model_matches_category(&self) -> bool {
        self.vehicle_category
            .models()
            .contains(&self.vehicle_model.as_str())
    }
}

mod timestamp_format {
    use crate::configuration::config::TIMESTAMP_FORMAT;
    use chrono::NaiveDateTime;
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&value.format(TIMESTAMP_FORMAT).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).map_err(serde::de::Error::custom)
    }
}
