//! 内置站点适配器

pub mod anarchygolf;
pub mod aoj;
pub mod codeforces;
pub mod hackerrank;

use crate::factory::RegistryItem;

/// 收集内置适配器的注册项, 顺序即解析时的优先级
pub(crate) fn registry_items() -> Vec<RegistryItem> {
    vec![
        aoj::__REGISTRY_ITEM_AOJSERVICE(),
        anarchygolf::__REGISTRY_ITEM_ANARCHYGOLFSERVICE(),
        codeforces::__REGISTRY_ITEM_CODEFORCESSERVICE(),
        hackerrank::__REGISTRY_ITEM_HACKERRANKSERVICE(),
        codeforces::__REGISTRY_ITEM_CODEFORCESCONTEST(),
        aoj::__REGISTRY_ITEM_AOJPROBLEM(),
        aoj::__REGISTRY_ITEM_AOJARENAPROBLEM(),
        anarchygolf::__REGISTRY_ITEM_ANARCHYGOLFPROBLEM(),
        codeforces::__REGISTRY_ITEM_CODEFORCESPROBLEM(),
        hackerrank::__REGISTRY_ITEM_HACKERRANKPROBLEM(),
    ]
}

#[cfg(test)]
mod tests {
    use crate::factory::Registry;

    const PROBLEM_URLS: &[&str] = &[
        "http://judge.u-aizu.ac.jp/onlinejudge/description.jsp?id=2256",
        "https://onlinejudge.u-aizu.ac.jp/courses/library/4/CGL/3/CGL_3_B",
        "https://onlinejudge.u-aizu.ac.jp/problems/0423",
        "https://onlinejudge.u-aizu.ac.jp/services/room.html#RitsCamp19Day2/problems/A",
        "http://golf.shinh.org/p.rb?The+B+Programming+Language",
        "https://codeforces.com/contest/538/problem/H",
        "https://codeforces.com/problemset/problem/700/B",
        "https://codeforces.com/gym/101021/problem/A",
        "https://codeforces.com/edu/course/2/lesson/2/1/practice/contest/269100/problem/A",
        "https://www.hackerrank.com/contests/university-codesprint-2/challenges/the-story-of-a-tree",
        "https://www.hackerrank.com/challenges/fp-hello-world",
    ];

    const CONTEST_URLS: &[&str] = &[
        "https://codeforces.com/contest/538",
        "https://codeforces.com/gym/101021",
    ];

    const SERVICE_URLS: &[&str] = &[
        "http://judge.u-aizu.ac.jp/onlinejudge/",
        "http://golf.shinh.org/",
        "https://codeforces.com/",
        "https://www.hackerrank.com/",
    ];

    #[test]
    fn test_problem_fixtures_resolve_uniquely() {
        let registry = Registry::with_builtin_adapters();
        for url in PROBLEM_URLS {
            let matched = registry.matching_problem_adapters(url);
            assert_eq!(matched.len(), 1, "{url}: {matched:?}");

            let problem = registry.resolve_problem(url).unwrap();
            let canonical = problem.url();
            let again = registry.resolve_problem(&canonical).unwrap();
            assert_eq!(again.url(), canonical, "{url}");
        }
    }

    #[test]
    fn test_contest_fixtures_resolve_uniquely() {
        let registry = Registry::with_builtin_adapters();
        for url in CONTEST_URLS {
            assert_eq!(registry.matching_contest_adapters(url).len(), 1, "{url}");
            let contest = registry.resolve_contest(url).unwrap();
            assert_eq!(contest.url(), *url);
        }
    }

    #[test]
    fn test_service_fixtures_resolve_uniquely() {
        let registry = Registry::with_builtin_adapters();
        for url in SERVICE_URLS {
            assert_eq!(registry.matching_service_adapters(url).len(), 1, "{url}");
            let service = registry.resolve_service(url).unwrap();
            assert_eq!(registry.resolve_service(&service.url()).unwrap().name(), service.name());
        }
    }

    #[test]
    fn test_problem_service_link() {
        let registry = Registry::with_builtin_adapters();
        let problem = registry
            .resolve_problem("https://codeforces.com/contest/538/problem/H")
            .unwrap();
        assert_eq!(problem.service().name(), "Codeforces");
        assert!(registry.resolve_problem("https://example.com/problem/1").is_none());
        assert!(
            registry
                .resolve_contest("https://codeforces.com/problemset/problem/700/B")
                .is_none()
        );
    }
}
