// 地理计算
// 方向字符串、球面距离、六边形扫描网格

pub mod transform;

use crate::common::Location;

/// 方向判断的容差（度）
const DIRECTION_EPSILON: f64 = 1e-4;

/// 弧度转米的系数，和上游地图数据保持一致，不是常见的 6371000
pub const RADIANS_TO_METERS: f64 = 6_366_468.241_830_914;

/// 六边形网格的南北间距（米）
pub const HEX_LAT_GAP_METERS: f64 = 150.0;

/// 六边形网格的东西间距（米）
pub const HEX_LNG_GAP_METERS: f64 = 86.6;

/// 1度纬度约111111米
pub const METERS_PER_DEGREE: f64 = 111_111.0;

/// 从 origin 看 target 的方向，例如 "NE"、"S"，两点重合时为空字符串
pub fn direction_string(origin: &Location, target: &Location) -> String {
    let d_lat = target.latitude - origin.latitude;
    let d_lng = target.longitude - origin.longitude;

    let mut direction = String::with_capacity(2);
    if d_lat.abs() > DIRECTION_EPSILON {
        direction.push(if d_lat >= 0.0 { 'N' } else { 'S' });
    }
    if d_lng.abs() > DIRECTION_EPSILON {
        direction.push(if d_lng >= 0.0 { 'E' } else { 'W' });
    }
    direction
}

/// 两点间的球面夹角（弧度），haversine 公式
pub fn angular_distance(origin: &Location, target: &Location) -> f64 {
    let lat1 = origin.latitude.to_radians();
    let lat2 = target.latitude.to_radians();
    let d_lat = (0.5 * (lat2 - lat1)).sin();
    let d_lng = (0.5 * (target.longitude.to_radians() - origin.longitude.to_radians())).sin();

    // cos 的乘积先算，交换两点时结果不变
    let x = d_lat * d_lat + d_lng * d_lng * (lat1.cos() * lat2.cos());
    2.0 * x.min(1.0).sqrt().asin()
}

/// 两点间的距离（米）
pub fn distance_meters(origin: &Location, target: &Location) -> f64 {
    angular_distance(origin, target) * RADIANS_TO_METERS
}

/// 指定纬度上六边形网格的经度间距（度）
///
/// 纬度接近 ±90 时 cos 趋近于 0，调用方需要自己避开极点。
pub fn hex_lng_degrees(latitude: f64) -> f64 {
    HEX_LNG_GAP_METERS / (METERS_PER_DEGREE * latitude.to_radians().cos())
}

/// 六边形网格的纬度间距（度）
pub fn hex_lat_degrees() -> f64 {
    HEX_LAT_GAP_METERS / METERS_PER_DEGREE
}

/// 以 origin 为中心按六边形螺旋生成扫描点
///
/// 第 0 圈只有中心点，第 r 圈有 6r 个点，一共 `1 + 3n(n-1)` 个点。
/// 中心点在极点上时返回 `None`。
pub fn hex_steps(origin: Location, rings: u32) -> Option<Vec<Location>> {
    if origin.latitude.abs() >= 90.0 {
        return None;
    }

    let lat_gap = hex_lat_degrees();
    let mut steps = Vec::with_capacity(hex_step_count(rings));
    steps.push(origin);

    let mut lat = origin.latitude;
    let mut lng = origin.longitude;
    for ring in 1..rings {
        // 先移到左上角，再绕一圈回到这里，作为下一圈的起点
        lat += lat_gap;
        lng -= hex_lng_degrees(lat);

        for direction in 0..6 {
            for _ in 0..ring {
                match direction {
                    // 右
                    0 => lng += hex_lng_degrees(lat) * 2.0,
                    // 右下
                    1 => {
                        lat -= lat_gap;
                        lng += hex_lng_degrees(lat);
                    }
                    // 左下
                    2 => {
                        lat -= lat_gap;
                        lng -= hex_lng_degrees(lat);
                    }
                    // 左
                    3 => lng -= hex_lng_degrees(lat) * 2.0,
                    // 左上
                    4 => {
                        lat += lat_gap;
                        lng -= hex_lng_degrees(lat);
                    }
                    // 右上
                    _ => {
                        lat += lat_gap;
                        lng += hex_lng_degrees(lat);
                    }
                }
                steps.push(Location::new(lat, lng));
            }
        }
    }

    Some(steps)
}

pub fn hex_step_count(rings: u32) -> usize {
    let n = rings.max(1) as usize;
    1 + 3 * n * (n - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loc(latitude: f64, longitude: f64) -> Location {
        Location::new(latitude, longitude)
    }

    #[test]
    fn direction_within_tolerance_is_empty() {
        let origin = loc(40.0, -74.0);
        assert_eq!(direction_string(&origin, &origin), "");
        assert_eq!(direction_string(&origin, &loc(40.00005, -74.00009)), "");
        assert_eq!(direction_string(&origin, &loc(39.99991, -73.99995)), "");
    }

    #[test]
    fn direction_letters_follow_deltas() {
        let origin = loc(40.0, -74.0);
        assert_eq!(direction_string(&origin, &loc(40.01, -73.99)), "NE");
        assert_eq!(direction_string(&origin, &loc(39.99, -74.01)), "SW");
        assert_eq!(direction_string(&origin, &loc(40.01, -74.0)), "N");
        assert_eq!(direction_string(&origin, &loc(40.0, -74.01)), "W");
    }

    #[test]
    fn direction_flips_when_points_swap() {
        let pairs = [
            (loc(1.0, 1.0), loc(1.5, 0.5)),
            (loc(-33.9, 151.2), loc(-33.8, 151.2)),
            (loc(51.5, -0.12), loc(51.5, -0.2)),
        ];
        for (a, b) in pairs {
            let forward = direction_string(&a, &b);
            let backward = direction_string(&b, &a);
            let flipped: String = forward
                .chars()
                .map(|c| match c {
                    'N' => 'S',
                    'S' => 'N',
                    'E' => 'W',
                    _ => 'E',
                })
                .collect();
            assert_eq!(flipped, backward);
        }
    }

    #[test]
    fn distance_is_zero_for_same_point_and_symmetric() {
        let a = loc(37.7749, -122.4194);
        let b = loc(34.0522, -118.2437);
        assert_eq!(distance_meters(&a, &a), 0.0);
        assert_eq!(distance_meters(&a, &b), distance_meters(&b, &a));
    }

    #[test]
    fn distance_is_bit_for_bit_symmetric() {
        let pairs = [
            (loc(40.7128, -74.0060), loc(40.2, -68.1)),
            (loc(-33.8688, 151.2093), loc(-37.8136, 144.9631)),
            (loc(51.5074, -0.1278), loc(48.8566, 2.3522)),
            (loc(0.0, 0.0), loc(0.001, 179.999)),
        ];
        for (a, b) in pairs {
            let ab = distance_meters(&a, &b);
            let ba = distance_meters(&b, &a);
            assert_eq!(ab.to_bits(), ba.to_bits(), "{ab} vs {ba}");
        }
    }

    #[test]
    fn distance_uses_fixed_radius() {
        // 赤道上 1 度经度
        let d = distance_meters(&loc(0.0, 0.0), &loc(0.0, 1.0));
        let expected = 1f64.to_radians() * RADIANS_TO_METERS;
        assert!((d - expected).abs() < 1e-6, "{d} vs {expected}");
    }

    #[test]
    fn hex_spacing_at_equator() {
        assert_eq!(hex_lng_degrees(0.0), 86.6 / 111111.0);
        assert!(hex_lng_degrees(60.0) > hex_lng_degrees(0.0));
    }

    #[test]
    fn hex_steps_count_per_ring() {
        let origin = loc(40.0, -74.0);
        assert_eq!(hex_steps(origin, 1).unwrap(), vec![origin]);
        assert_eq!(hex_steps(origin, 2).unwrap().len(), 7);
        assert_eq!(hex_steps(origin, 5).unwrap().len(), hex_step_count(5));
        assert_eq!(hex_step_count(5), 61);
    }

    #[test]
    fn first_ring_surrounds_origin() {
        let origin = loc(40.0, -74.0);
        let steps = hex_steps(origin, 2).unwrap();
        for step in &steps[1..] {
            let d = distance_meters(&origin, step);
            assert!(d > 100.0 && d < 200.0, "step {step:?} is {d} m away");
        }
        // 绕一圈回到左上角
        let last = steps.last().unwrap();
        assert!(last.latitude > origin.latitude);
        assert!(last.longitude < origin.longitude);
    }

    #[test]
    fn hex_steps_refuse_poles() {
        assert!(hex_steps(loc(90.0, 0.0), 3).is_none());
        assert!(hex_steps(loc(-90.0, 0.0), 3).is_none());
    }
}
