//! Static registry of the canonical channels the guide is built for

use std::collections::HashMap;

use crate::errors::{AppError, AppResult};
use crate::models::{Channel, ChannelGroup};

const BUILTIN_CCTV: &[(&str, &str)] = &[
    ("CCTV1", "CCTV-1 综合"),
    ("CCTV2", "CCTV-2 财经"),
    ("CCTV3", "CCTV-3 综艺"),
    ("CCTV4", "CCTV-4 中文国际"),
    ("CCTV5", "CCTV-5 体育"),
    ("CCTV5PLUS", "CCTV-5+ 体育赛事"),
    ("CCTV6", "CCTV-6 电影"),
    ("CCTV7", "CCTV-7 国防军事"),
    ("CCTV8", "CCTV-8 电视剧"),
    ("CCTV9", "CCTV-9 纪录"),
    ("CCTV10", "CCTV-10 科教"),
    ("CCTV11", "CCTV-11 戏曲"),
    ("CCTV12", "CCTV-12 社会与法"),
    ("CCTV13", "CCTV-13 新闻"),
    ("CCTV14", "CCTV-14 少儿"),
    ("CCTV15", "CCTV-15 音乐"),
    ("CCTV16", "CCTV-16 奥林匹克"),
    ("CCTV17", "CCTV-17 农业农村"),
];

const BUILTIN_SATELLITE: &[(&str, &str)] = &[
    ("BeijingTV", "北京卫视"),
    ("DragonTV", "东方卫视"),
    ("ZhejiangTV", "浙江卫视"),
    ("HunanTV", "湖南卫视"),
    ("JiangsuTV", "江苏卫视"),
    ("GuangdongTV", "广东卫视"),
    ("SichuanTV", "四川卫视"),
    ("HebeiTV", "河北卫视"),
    ("ShanxiTV", "山西卫视"),
    ("InnerMongoliaTV", "内蒙古卫视"),
    ("LiaoningTV", "辽宁卫视"),
    ("JilinTV", "吉林卫视"),
    ("HeilongjiangTV", "黑龙江卫视"),
    ("ShanghaiTV", "上海卫视"),
    ("AnhuiTV", "安徽卫视"),
    ("FujianTV", "东南卫视"),
    ("JiangxiTV", "江西卫视"),
    ("ShandongTV", "山东卫视"),
    ("HenanTV", "河南卫视"),
    ("HubeiTV", "湖北卫视"),
    ("HainanTV", "海南卫视"),
    ("ChongqingTV", "重庆卫视"),
    ("GuizhouTV", "贵州卫视"),
    ("YunnanTV", "云南卫视"),
    ("ShaanxiTV", "陕西卫视"),
    ("GansuTV", "甘肃卫视"),
    ("QinghaiTV", "青海卫视"),
    ("NingxiaTV", "宁夏卫视"),
    ("XinjiangTV", "新疆卫视"),
    ("XizangTV", "西藏卫视"),
];

/// Immutable, ordered set of catalog channels
///
/// Declaration order is preserved: the XMLTV output lists channels in this
/// order and fuzzy matching breaks ties by it.
#[derive(Debug, Clone)]
pub struct ChannelCatalog {
    channels: Vec<Channel>,
    index: HashMap<String, usize>,
}

impl ChannelCatalog {
    /// Build a catalog, rejecting blank or duplicate ids
    pub fn new(channels: Vec<Channel>) -> AppResult<Self> {
        let mut index = HashMap::with_capacity(channels.len());
        for (position, channel) in channels.iter().enumerate() {
            if channel.id.trim().is_empty() {
                return Err(AppError::configuration(format!(
                    "catalog entry #{} has an empty id",
                    position + 1
                )));
            }
            if channel.name.trim().is_empty() {
                return Err(AppError::configuration(format!(
                    "catalog channel '{}' has an empty name",
                    channel.id
                )));
            }
            if index.insert(channel.id.clone(), position).is_some() {
                return Err(AppError::configuration(format!(
                    "duplicate catalog channel id '{}'",
                    channel.id
                )));
            }
        }

        Ok(Self { channels, index })
    }

    /// The built-in catalog of CCTV and provincial satellite channels
    pub fn builtin() -> Self {
        let channels = BUILTIN_CCTV
            .iter()
            .map(|(id, name)| Channel::new(*id, *name, ChannelGroup::Cctv))
            .chain(
                BUILTIN_SATELLITE
                    .iter()
                    .map(|(id, name)| Channel::new(*id, *name, ChannelGroup::Satellite)),
            )
            .collect::<Vec<_>>();

        let index = channels
            .iter()
            .enumerate()
            .map(|(position, channel)| (channel.id.clone(), position))
            .collect();

        Self { channels, index }
    }

    pub fn get(&self, id: &str) -> Option<&Channel> {
        self.index.get(id).map(|&position| &self.channels[position])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn is_cctv(&self, id: &str) -> bool {
        self.get(id).is_some_and(Channel::is_cctv)
    }

    /// Size of the CCTV sub-catalog
    pub fn cctv_count(&self) -> usize {
        self.channels.iter().filter(|c| c.is_cctv()).count()
    }
}

impl Default for ChannelCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_catalog_shape() {
        let catalog = ChannelCatalog::builtin();
        assert_eq!(catalog.cctv_count(), 18);
        assert_eq!(catalog.len(), 48);
        assert_eq!(catalog.get("CCTV1").unwrap().name, "CCTV-1 综合");
        assert!(catalog.is_cctv("CCTV5PLUS"));
        assert!(!catalog.is_cctv("HunanTV"));
        assert!(!catalog.is_cctv("NoSuchChannel"));
    }

    #[test]
    fn test_builtin_ids_are_unique() {
        let catalog = ChannelCatalog::builtin();
        let rebuilt = ChannelCatalog::new(catalog.iter().cloned().collect());
        assert!(rebuilt.is_ok());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = ChannelCatalog::new(vec![
            Channel::new("A", "Alpha", ChannelGroup::Satellite),
            Channel::new("A", "Again", ChannelGroup::Satellite),
        ]);
        assert!(matches!(result, Err(AppError::Configuration { .. })));
    }

    #[test]
    fn test_iteration_keeps_declaration_order() {
        let catalog = ChannelCatalog::new(vec![
            Channel::new("Z", "Zulu", ChannelGroup::Satellite),
            Channel::new("A", "Alpha", ChannelGroup::Cctv),
        ])
        .unwrap();
        let ids: Vec<_> = catalog.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["Z", "A"]);
    }
}
