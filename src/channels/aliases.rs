//! Known spellings of catalog channel names
//!
//! Entry order matters: substring matching in the normalizer returns the
//! first hit in table order.

use std::collections::HashMap;

const CCTV_ALIASES: &[(&str, &str)] = &[
    ("CCTV1", "CCTV-1 综合"),
    ("CCTV-1", "CCTV-1 综合"),
    ("CCTV-1 综合", "CCTV-1 综合"),
    ("央视一套", "CCTV-1 综合"),
    ("cctv1", "CCTV-1 综合"),
    ("cctv-1", "CCTV-1 综合"),
    ("cctv-1 综合", "CCTV-1 综合"),
    ("中央电视台综合频道", "CCTV-1 综合"),
    ("综合频道", "CCTV-1 综合"),
    ("CCTV2", "CCTV-2 财经"),
    ("CCTV-2", "CCTV-2 财经"),
    ("CCTV-2 财经", "CCTV-2 财经"),
    ("央视二套", "CCTV-2 财经"),
    ("cctv2", "CCTV-2 财经"),
    ("cctv-2", "CCTV-2 财经"),
    ("cctv-2 财经", "CCTV-2 财经"),
    ("中央电视台财经频道", "CCTV-2 财经"),
    ("财经频道", "CCTV-2 财经"),
    ("CCTV3", "CCTV-3 综艺"),
    ("CCTV-3", "CCTV-3 综艺"),
    ("CCTV-3 综艺", "CCTV-3 综艺"),
    ("央视三套", "CCTV-3 综艺"),
    ("cctv3", "CCTV-3 综艺"),
    ("cctv-3", "CCTV-3 综艺"),
    ("cctv-3 综艺", "CCTV-3 综艺"),
    ("中央电视台综艺频道", "CCTV-3 综艺"),
    ("综艺频道", "CCTV-3 综艺"),
    ("CCTV4", "CCTV-4 中文国际"),
    ("CCTV-4", "CCTV-4 中文国际"),
    ("CCTV-4 中文国际", "CCTV-4 中文国际"),
    ("央视四套", "CCTV-4 中文国际"),
    ("cctv4", "CCTV-4 中文国际"),
    ("cctv-4", "CCTV-4 中文国际"),
    ("cctv-4 中文国际", "CCTV-4 中文国际"),
    ("中央电视台中文国际频道", "CCTV-4 中文国际"),
    ("中文国际频道", "CCTV-4 中文国际"),
    ("国际频道", "CCTV-4 中文国际"),
    ("CCTV5", "CCTV-5 体育"),
    ("CCTV-5", "CCTV-5 体育"),
    ("CCTV-5 体育", "CCTV-5 体育"),
    ("央视五套", "CCTV-5 体育"),
    ("cctv5", "CCTV-5 体育"),
    ("cctv-5", "CCTV-5 体育"),
    ("cctv-5 体育", "CCTV-5 体育"),
    ("中央电视台体育频道", "CCTV-5 体育"),
    ("体育频道", "CCTV-5 体育"),
    ("CCTV5+", "CCTV-5+ 体育赛事"),
    ("CCTV-5+", "CCTV-5+ 体育赛事"),
    ("CCTV-5+ 体育赛事", "CCTV-5+ 体育赛事"),
    ("央视五套+", "CCTV-5+ 体育赛事"),
    ("cctv5+", "CCTV-5+ 体育赛事"),
    ("cctv-5+", "CCTV-5+ 体育赛事"),
    ("体育赛事频道", "CCTV-5+ 体育赛事"),
    ("CCTV6", "CCTV-6 电影"),
    ("CCTV-6", "CCTV-6 电影"),
    ("CCTV-6 电影", "CCTV-6 电影"),
    ("央视六套", "CCTV-6 电影"),
    ("cctv6", "CCTV-6 电影"),
    ("cctv-6", "CCTV-6 电影"),
    ("cctv-6 电影", "CCTV-6 电影"),
    ("中央电视台电影频道", "CCTV-6 电影"),
    ("电影频道", "CCTV-6 电影"),
    ("CCTV7", "CCTV-7 国防军事"),
    ("CCTV-7", "CCTV-7 国防军事"),
    ("CCTV-7 国防军事", "CCTV-7 国防军事"),
    ("央视七套", "CCTV-7 国防军事"),
    ("cctv7", "CCTV-7 国防军事"),
    ("cctv-7", "CCTV-7 国防军事"),
    ("cctv-7 国防军事", "CCTV-7 国防军事"),
    ("中央电视台国防军事频道", "CCTV-7 国防军事"),
    ("国防军事频道", "CCTV-7 国防军事"),
    ("CCTV8", "CCTV-8 电视剧"),
    ("CCTV-8", "CCTV-8 电视剧"),
    ("CCTV-8 电视剧", "CCTV-8 电视剧"),
    ("央视八套", "CCTV-8 电视剧"),
    ("cctv8", "CCTV-8 电视剧"),
    ("cctv-8", "CCTV-8 电视剧"),
    ("cctv-8 电视剧", "CCTV-8 电视剧"),
    ("中央电视台电视剧频道", "CCTV-8 电视剧"),
    ("电视剧频道", "CCTV-8 电视剧"),
    ("CCTV9", "CCTV-9 纪录"),
    ("CCTV-9", "CCTV-9 纪录"),
    ("CCTV-9 纪录", "CCTV-9 纪录"),
    ("央视九套", "CCTV-9 纪录"),
    ("cctv9", "CCTV-9 纪录"),
    ("cctv-9", "CCTV-9 纪录"),
    ("cctv-9 纪录", "CCTV-9 纪录"),
    ("中央电视台纪录频道", "CCTV-9 纪录"),
    ("纪录频道", "CCTV-9 纪录"),
    ("CCTV10", "CCTV-10 科教"),
    ("CCTV-10", "CCTV-10 科教"),
    ("CCTV-10 科教", "CCTV-10 科教"),
    ("央视十套", "CCTV-10 科教"),
    ("cctv10", "CCTV-10 科教"),
    ("cctv-10", "CCTV-10 科教"),
    ("cctv-10 科教", "CCTV-10 科教"),
    ("中央电视台科教频道", "CCTV-10 科教"),
    ("科教频道", "CCTV-10 科教"),
    ("CCTV11", "CCTV-11 戏曲"),
    ("CCTV-11", "CCTV-11 戏曲"),
    ("CCTV-11 戏曲", "CCTV-11 戏曲"),
    ("央视十一套", "CCTV-11 戏曲"),
    ("cctv11", "CCTV-11 戏曲"),
    ("cctv-11", "CCTV-11 戏曲"),
    ("cctv-11 戏曲", "CCTV-11 戏曲"),
    ("中央电视台戏曲频道", "CCTV-11 戏曲"),
    ("戏曲频道", "CCTV-11 戏曲"),
    ("CCTV12", "CCTV-12 社会与法"),
    ("CCTV-12", "CCTV-12 社会与法"),
    ("CCTV-12 社会与法", "CCTV-12 社会与法"),
    ("央视十二套", "CCTV-12 社会与法"),
    ("cctv12", "CCTV-12 社会与法"),
    ("cctv-12", "CCTV-12 社会与法"),
    ("cctv-12 社会与法", "CCTV-12 社会与法"),
    ("中央电视台社会与法频道", "CCTV-12 社会与法"),
    ("社会与法频道", "CCTV-12 社会与法"),
    ("CCTV13", "CCTV-13 新闻"),
    ("CCTV-13", "CCTV-13 新闻"),
    ("CCTV-13 新闻", "CCTV-13 新闻"),
    ("央视十三套", "CCTV-13 新闻"),
    ("cctv13", "CCTV-13 新闻"),
    ("cctv-13", "CCTV-13 新闻"),
    ("cctv-13 新闻", "CCTV-13 新闻"),
    ("中央电视台新闻频道", "CCTV-13 新闻"),
    ("新闻频道", "CCTV-13 新闻"),
    ("CCTV14", "CCTV-14 少儿"),
    ("CCTV-14", "CCTV-14 少儿"),
    ("CCTV-14 少儿", "CCTV-14 少儿"),
    ("央视十四套", "CCTV-14 少儿"),
    ("cctv14", "CCTV-14 少儿"),
    ("cctv-14", "CCTV-14 少儿"),
    ("cctv-14 少儿", "CCTV-14 少儿"),
    ("中央电视台少儿频道", "CCTV-14 少儿"),
    ("少儿频道", "CCTV-14 少儿"),
    ("CCTV15", "CCTV-15 音乐"),
    ("CCTV-15", "CCTV-15 音乐"),
    ("CCTV-15 音乐", "CCTV-15 音乐"),
    ("央视十五套", "CCTV-15 音乐"),
    ("cctv15", "CCTV-15 音乐"),
    ("cctv-15", "CCTV-15 音乐"),
    ("cctv-15 音乐", "CCTV-15 音乐"),
    ("中央电视台音乐频道", "CCTV-15 音乐"),
    ("音乐频道", "CCTV-15 音乐"),
    ("CCTV16", "CCTV-16 奥林匹克"),
    ("CCTV-16", "CCTV-16 奥林匹克"),
    ("CCTV-16 奥林匹克", "CCTV-16 奥林匹克"),
    ("央视十六套", "CCTV-16 奥林匹克"),
    ("cctv16", "CCTV-16 奥林匹克"),
    ("cctv-16", "CCTV-16 奥林匹克"),
    ("cctv-16 奥林匹克", "CCTV-16 奥林匹克"),
    ("中央电视台奥林匹克频道", "CCTV-16 奥林匹克"),
    ("奥林匹克频道", "CCTV-16 奥林匹克"),
    ("CCTV17", "CCTV-17 农业农村"),
    ("CCTV-17", "CCTV-17 农业农村"),
    ("CCTV-17 农业农村", "CCTV-17 农业农村"),
    ("央视十七套", "CCTV-17 农业农村"),
    ("cctv17", "CCTV-17 农业农村"),
    ("cctv-17", "CCTV-17 农业农村"),
    ("cctv-17 农业农村", "CCTV-17 农业农村"),
    ("中央电视台农业农村频道", "CCTV-17 农业农村"),
    ("农业农村频道", "CCTV-17 农业农村"),
];

const SATELLITE_ALIASES: &[(&str, &str)] = &[
    ("北京卫视", "北京卫视"),
    ("BTV", "北京卫视"),
    ("BTV-1", "北京卫视"),
    ("北京电视台", "北京卫视"),
    ("东方卫视", "东方卫视"),
    ("DragonTV", "东方卫视"),
    ("SMG", "东方卫视"),
    ("上海东方卫视", "东方卫视"),
    ("湖南卫视", "湖南卫视"),
    ("HunanTV", "湖南卫视"),
    ("湖南电视台", "湖南卫视"),
    ("江苏卫视", "江苏卫视"),
    ("JiangsuTV", "江苏卫视"),
    ("JSTV", "江苏卫视"),
    ("浙江卫视", "浙江卫视"),
    ("ZhejiangTV", "浙江卫视"),
    ("ZJTV", "浙江卫视"),
    ("广东卫视", "广东卫视"),
    ("GuangdongTV", "广东卫视"),
    ("GDTV", "广东卫视"),
    ("山东卫视", "山东卫视"),
    ("ShandongTV", "山东卫视"),
    ("SDTV", "山东卫视"),
    ("安徽卫视", "安徽卫视"),
    ("AnhuiTV", "安徽卫视"),
    ("AHTV", "安徽卫视"),
    ("河南卫视", "河南卫视"),
    ("HenanTV", "河南卫视"),
    ("HNTV", "河南卫视"),
    ("湖北卫视", "湖北卫视"),
    ("HubeiTV", "湖北卫视"),
    ("HBTV", "湖北卫视"),
];

/// Ordered variant → canonical display name table
///
/// Inserting an existing key replaces its value but keeps its position.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in CCTV table followed by the satellite table
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for (variant, canonical) in CCTV_ALIASES.iter().chain(SATELLITE_ALIASES) {
            table.insert(*variant, *canonical);
        }
        table
    }

    pub fn insert<V: Into<String>, C: Into<String>>(&mut self, variant: V, canonical: C) {
        let variant = variant.into();
        let canonical = canonical.into();
        match self.index.get(&variant) {
            Some(&position) => self.entries[position].1 = canonical,
            None => {
                self.index.insert(variant.clone(), self.entries.len());
                self.entries.push((variant, canonical));
            }
        }
    }

    /// Exact, case-sensitive lookup
    pub fn get(&self, variant: &str) -> Option<&str> {
        self.index
            .get(variant)
            .map(|&position| self.entries[position].1.as_str())
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Into<String>, C: Into<String>> FromIterator<(V, C)> for AliasTable {
    fn from_iter<T: IntoIterator<Item = (V, C)>>(iter: T) -> Self {
        let mut table = Self::new();
        for (variant, canonical) in iter {
            table.insert(variant, canonical);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_table_order_starts_with_cctv1() {
        let table = AliasTable::builtin();
        let first = table.iter().next().unwrap();
        assert_eq!(first, ("CCTV1", "CCTV-1 综合"));
        assert_eq!(table.len(), CCTV_ALIASES.len() + SATELLITE_ALIASES.len());
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let mut table: AliasTable = vec![("a", "A"), ("b", "B")].into_iter().collect();
        table.insert("a", "Alpha");
        let entries: Vec<_> = table.iter().collect();
        assert_eq!(entries, vec![("a", "Alpha"), ("b", "B")]);
        assert_eq!(table.get("a"), Some("Alpha"));
        assert_eq!(table.get("A"), None);
    }
}
