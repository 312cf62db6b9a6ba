//! Web OAuth user profile (sns/userinfo).
//!
//! Endpoint (GET):
//!   https://api.weixin.qq.com/sns/userinfo?access_token=ACCESS_TOKEN&openid=OPENID&lang=zh_CN
//!
//! Requires an access_token obtained under `snsapi_userinfo`.
//!
//! Response example:
//! {
//!   "openid": "OPENID",
//!   "nickname": "NICKNAME",
//!   "sex": 1,
//!   "province": "PROVINCE",
//!   "city": "CITY",
//!   "country": "COUNTRY",
//!   "headimgurl": "https://thirdwx.qlogo.cn/mmopen/g3MonUZtNHkdmzicIlibx6iaFqAc56vxLSUfpb6n5WKSYVY0ChQKkiaJSgQ1dZuTOgvLLrhJbERQQ4eMsv84eavHiaiceqxibJxCfHe/46",
//!   "privilege": ["PRIVILEGE1", "PRIVILEGE2"],
//!   "unionid": "o6_bmasdasdsad6_2sgVt7hMZOPfL"
//! }

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, instrument};

use crate::client::{
    Error, OAuthClient, Result, endpoint_url, from_value, has_str_field, redact_id, rejection,
    require,
};

/// Language of the region fields (province/city/country)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lang {
    #[default]
    #[serde(rename = "zh_CN")]
    ZhCn,
    #[serde(rename = "zh_TW")]
    ZhTw,
    #[serde(rename = "en")]
    En,
}

impl Lang {
    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::ZhCn => "zh_CN",
            Lang::ZhTw => "zh_TW",
            Lang::En => "en",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lang {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "zh_CN" => Ok(Lang::ZhCn),
            "zh_TW" => Ok(Lang::ZhTw),
            "en" => Ok(Lang::En),
            other => Err(Error::InvalidInput(format!("unsupported lang: {other}"))),
        }
    }
}

/// Gender as reported by WeChat
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Sex {
    Unknown,
    Male,
    Female,
}

impl From<u8> for Sex {
    fn from(v: u8) -> Self {
        match v {
            1 => Sex::Male,
            2 => Sex::Female,
            _ => Sex::Unknown,
        }
    }
}

/// User profile returned by sns/userinfo
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInfo {
    pub openid: String,
    #[serde(default)]
    pub nickname: String,
    /// 0 unknown, 1 male, 2 female
    #[serde(default)]
    pub sex: u8,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    /// Avatar URL; empty when the user has none
    #[serde(default)]
    pub headimgurl: String,
    /// `null` and a missing key both read as empty
    #[serde(default, deserialize_with = "null_as_empty")]
    pub privilege: Vec<String>,
    /// Only when the account is bound to an Open Platform account
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unionid: Option<String>,
}

fn null_as_empty<'de, D>(de: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(de)?.unwrap_or_default())
}

impl UserInfo {
    pub fn sex(&self) -> Sex {
        Sex::from(self.sex)
    }
}

impl OAuthClient {
    /// Fetch the user profile for an `snsapi_userinfo` access_token.
    ///
    /// `lang` is only sent when given; WeChat falls back to zh_CN.
    #[instrument(level = "debug", skip(self, access_token, openid))]
    pub async fn fetch_user_info(
        &self,
        access_token: &str,
        openid: &str,
        lang: Option<Lang>,
    ) -> Result<UserInfo> {
        require("access_token", access_token)?;
        require("openid", openid)?;

        let mut pairs = vec![("access_token", access_token), ("openid", openid)];
        if let Some(lang) = lang {
            pairs.push(("lang", lang.as_str()));
        }
        let url = endpoint_url(&self.endpoints().userinfo, &pairs)?;
        debug!(openid = %redact_id(openid), "userinfo request");

        let (status, body) = self.get_json(url).await?;
        if !has_str_field(&body, "openid") {
            return Err(rejection(status, &body, "openid"));
        }
        from_value(status, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_profile() {
        let raw = r#"{
            "openid": "OPENID",
            "nickname": "NICKNAME",
            "sex": 2,
            "province": "Guangdong",
            "city": "Shenzhen",
            "country": "CN",
            "headimgurl": "https://thirdwx.qlogo.cn/x/46",
            "privilege": ["PRIVILEGE1", "PRIVILEGE2"],
            "unionid": "UNIONID"
        }"#;
        let u: UserInfo = serde_json::from_str(raw).expect("decode");
        assert_eq!(u.openid, "OPENID");
        assert_eq!(u.sex(), Sex::Female);
        assert_eq!(u.privilege, vec!["PRIVILEGE1", "PRIVILEGE2"]);
        assert_eq!(u.unionid.as_deref(), Some("UNIONID"));
    }

    #[test]
    fn unionid_is_optional() {
        let u: UserInfo = serde_json::from_str(r#"{"openid":"o1","sex":0,"privilege":[]}"#)
            .expect("decode");
        assert_eq!(u.unionid, None);
        assert_eq!(u.sex(), Sex::Unknown);
        assert!(u.nickname.is_empty());
    }

    #[test]
    fn null_privilege_reads_as_empty() {
        let u: UserInfo =
            serde_json::from_str(r#"{"openid":"o1","privilege":null}"#).expect("decode");
        assert!(u.privilege.is_empty());
        let u: UserInfo = serde_json::from_str(r#"{"openid":"o1"}"#).expect("decode");
        assert!(u.privilege.is_empty());
    }

    #[test]
    fn lang_values() {
        assert_eq!(Lang::default().as_str(), "zh_CN");
        assert_eq!("zh_TW".parse::<Lang>().unwrap(), Lang::ZhTw);
        assert_eq!("en".parse::<Lang>().unwrap(), Lang::En);
        assert!("fr".parse::<Lang>().is_err());
    }

    #[test]
    fn sex_mapping() {
        assert_eq!(Sex::from(1), Sex::Male);
        assert_eq!(Sex::from(2), Sex::Female);
        assert_eq!(Sex::from(0), Sex::Unknown);
        assert_eq!(Sex::from(9), Sex::Unknown);
    }
}
