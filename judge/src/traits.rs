//! 实体与能力特型

/*
 * Copyright (c) 2025 fltLi
 *
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use std::fmt::Debug;

use crate::error::*;
use crate::models::*;
use crate::session::{CredentialsProvider, Session};
use crate::zipper::LabelMarkers;

/// 适配器元数据, 由 `#[derive(SiteAdapter)]` 生成
pub trait Adapter {
    fn adapter_name(&self) -> &'static str;

    /// 主机白名单
    fn hosts() -> &'static [&'static str]
    where
        Self: Sized;
}

/// URL 与身份的互相转换
///
/// `from_url` 不做 I/O; 对 `get_url` 给出的规范地址, `from_url` 必须还原出相等的身份.
pub trait Resolvable: Sized {
    fn from_url(url: &str) -> Option<Self>;

    fn get_url(&self) -> String;
}

/// 评测站点
pub trait Service: Adapter + Debug + Send + Sync {
    fn name(&self) -> &'static str {
        self.adapter_name()
    }

    fn url(&self) -> String;

    fn as_login_probe(&self) -> Option<&dyn LoginProbe> {
        None
    }

    fn as_login_capable(&self) -> Option<&dyn LoginCapable> {
        None
    }
}

/// 比赛
pub trait Contest: Adapter + Debug + Send + Sync {
    fn url(&self) -> String;

    fn service(&self) -> Box<dyn Service>;

    /// 按站点给出的顺序返回题目, 不重新排序
    fn list_problems(&self, session: &dyn Session) -> Result<Vec<Box<dyn Problem>>>;
}

/// 题目
pub trait Problem: Adapter + Debug + Send + Sync {
    fn url(&self) -> String;

    fn service(&self) -> Box<dyn Service>;

    fn as_sample_downloadable(&self) -> Option<&dyn SampleDownloadable> {
        None
    }

    fn as_system_case_downloadable(&self) -> Option<&dyn SystemCaseDownloadable> {
        None
    }

    fn as_language_listable(&self) -> Option<&dyn LanguageListable> {
        None
    }

    fn as_submittable(&self) -> Option<&dyn Submittable> {
        None
    }
}

pub trait SampleDownloadable {
    /// 公开样例, 可以为空
    fn download_sample_cases(&self, session: &dyn Session) -> Result<Vec<TestCase>>;
}

pub trait SystemCaseDownloadable {
    fn download_system_cases(&self, session: &dyn Session) -> Result<Vec<TestCase>>;
}

pub trait LanguageListable {
    /// # Errors
    /// 需要登录而未登录时返回 `Error::AuthenticationRequired`
    fn get_available_languages(&self, session: &dyn Session) -> Result<Vec<Language>>;
}

pub trait Submittable {
    /// 非幂等, 调用方不要盲目重试
    fn submit_code(&self, code: &[u8], language: &str, session: &dyn Session)
    -> Result<Submission>;
}

pub trait LoginProbe {
    /// 只探测, 不改变登录状态
    fn is_logged_in(&self, session: &dyn Session) -> Result<bool>;
}

pub trait LoginCapable: LoginProbe {
    /// 非幂等
    fn login(&self, get_credentials: CredentialsProvider<'_>, session: &dyn Session)
    -> Result<()>;
}

/// 以标题 + 内容片段形式提供样例的适配器
pub trait FragmentSource {
    fn fetch_fragments(&self, session: &dyn Session) -> Result<Vec<LabeledFragment>>;

    fn markers(&self) -> LabelMarkers {
        LabelMarkers::default()
    }
}

impl dyn Problem {
    pub fn download_sample_cases(&self, session: &dyn Session) -> Result<Vec<TestCase>> {
        self.as_sample_downloadable()
            .ok_or_else(|| Error::unsupported(self.adapter_name(), "sample download"))?
            .download_sample_cases(session)
    }

    pub fn download_system_cases(&self, session: &dyn Session) -> Result<Vec<TestCase>> {
        self.as_system_case_downloadable()
            .ok_or_else(|| Error::unsupported(self.adapter_name(), "system case download"))?
            .download_system_cases(session)
    }

    pub fn get_available_languages(&self, session: &dyn Session) -> Result<Vec<Language>> {
        self.as_language_listable()
            .ok_or_else(|| Error::unsupported(self.adapter_name(), "language listing"))?
            .get_available_languages(session)
    }

    pub fn submit_code(
        &self,
        code: &[u8],
        language: &str,
        session: &dyn Session,
    ) -> Result<Submission> {
        self.as_submittable()
            .ok_or_else(|| Error::unsupported(self.adapter_name(), "submission"))?
            .submit_code(code, language, session)
    }
}

impl dyn Service {
    pub fn login(
        &self,
        get_credentials: CredentialsProvider<'_>,
        session: &dyn Session,
    ) -> Result<()> {
        self.as_login_capable()
            .ok_or_else(|| Error::unsupported(self.adapter_name(), "login"))?
            .login(get_credentials, session)
    }

    pub fn is_logged_in(&self, session: &dyn Session) -> Result<bool> {
        self.as_login_probe()
            .ok_or_else(|| Error::unsupported(self.adapter_name(), "login probe"))?
            .is_logged_in(session)
    }
}
